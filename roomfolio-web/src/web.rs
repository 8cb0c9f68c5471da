//! Browser glue: canvas, DOM listeners, asset fetching and the frame loop.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use roomfolio_gpu_shared::frame::{MeshData, MeshHandle, RenderFrame, TextureData, TextureHandle};
use roomfolio_wgpu::GpuBackend;
use wasm_bindgen::prelude::*;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{AddEventListenerOptions, Document, Element, HtmlCanvasElement, HtmlVideoElement, Window};

use crate::app::{Experience, ExperienceStatus};
use crate::config::SiteConfig;
use crate::controls::{section_progress, ScrollProgress, SECTION_NAMES};
use crate::draco::DracoModule;
use crate::error::ExperienceError;
use crate::model::RoomModel;
use crate::resources::{Asset, AssetKind, AssetSource, VideoInfo};
use crate::sizes::Viewport;
use crate::surface::RenderSurface;
use crate::theme::Theme;

type Shared = Rc<RefCell<Experience<WebSurface>>>;

/// `RenderSurface` over the wgpu backend and the page's canvas.
pub struct WebSurface {
    canvas: HtmlCanvasElement,
    backend: GpuBackend,
    videos: HashMap<String, HtmlVideoElement>,
}

impl WebSurface {
    fn register_video(&mut self, asset: &str, video: HtmlVideoElement) {
        self.videos.insert(asset.to_string(), video);
    }
}

impl RenderSurface for WebSurface {
    fn resize(&mut self, viewport: &Viewport) {
        let (width, height) = viewport.physical_size();
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.backend.resize(width, height);
    }

    fn upload_mesh(&mut self, mesh: &MeshData) -> MeshHandle {
        self.backend.upload_mesh(mesh)
    }

    fn upload_texture(&mut self, texture: &TextureData) -> Result<TextureHandle, ExperienceError> {
        self.backend
            .upload_texture(texture)
            .map_err(|e| ExperienceError::Render(e.to_string()))
    }

    fn video_texture(&mut self, asset: &str, info: &VideoInfo) -> Option<TextureHandle> {
        let video = self.videos.get(asset)?.clone();
        Some(self.backend.create_video_texture(video, info.width, info.height))
    }

    fn draw(&mut self, frame: &RenderFrame) -> Result<(), ExperienceError> {
        self.backend
            .render(frame)
            .map_err(|e| ExperienceError::Render(e.to_string()))
    }
}

/// Handle returned to the page.
#[wasm_bindgen]
pub struct WebExperience {
    inner: Shared,
}

#[wasm_bindgen]
impl WebExperience {
    /// Switch light/dark. Returns the new mode.
    pub fn toggle_theme(&self) -> Result<String, JsValue> {
        let mut exp = self
            .inner
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("experience is busy"))?;
        Ok(exp.toggle_theme().as_str().to_string())
    }

    pub fn theme(&self) -> String {
        self.inner
            .try_borrow()
            .map(|exp| exp.theme().as_str().to_string())
            .unwrap_or_default()
    }

    /// `loading`, `ready` or `error`.
    pub fn status(&self) -> String {
        self.inner
            .try_borrow()
            .map(|exp| exp.status().as_str().to_string())
            .unwrap_or_default()
    }

    pub fn on_theme_switch(&self, callback: js_sys::Function) -> Result<(), JsValue> {
        self.with_mut(|exp| {
            exp.on_theme_switch.subscribe(move |theme: &Theme| {
                let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(theme.as_str()));
            })
        })
    }

    pub fn on_controls_enabled(&self, callback: js_sys::Function) -> Result<(), JsValue> {
        self.with_mut(|exp| {
            exp.on_controls_enabled.subscribe(move |_| {
                let _ = callback.call0(&JsValue::NULL);
            })
        })
    }

    pub fn on_error(&self, callback: js_sys::Function) -> Result<(), JsValue> {
        self.with_mut(|exp| {
            exp.on_error.subscribe(move |error: &ExperienceError| {
                let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(&error.to_string()));
            })
        })
    }
}

impl WebExperience {
    fn with_mut(&self, f: impl FnOnce(&mut Experience<WebSurface>)) -> Result<(), JsValue> {
        let mut exp = self
            .inner
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("experience is busy"))?;
        f(&mut exp);
        Ok(())
    }
}

/// Boot the experience on the page. `config_toml` is the site configuration
/// as TOML; defaults apply when absent.
#[wasm_bindgen]
pub async fn create_app(config_toml: Option<String>) -> Result<WebExperience, JsValue> {
    let config = match config_toml.as_deref() {
        Some(text) => SiteConfig::from_toml_str(text),
        None => Ok(SiteConfig::default()),
    }
    .map_err(to_js)?;
    log::set_max_level(config.log_level().to_level_filter());

    let window = web_sys::window().ok_or_else(|| to_js(ExperienceError::Dom("a window".into())))?;
    let document = window
        .document()
        .ok_or_else(|| to_js(ExperienceError::Dom("a document".into())))?;
    set_state(&document, "loading");

    match boot(config.clone(), &window, &document).await {
        Ok(app) => Ok(app),
        Err(e) => {
            show_error(&document, &config.error_selector, &e);
            Err(to_js(e))
        }
    }
}

async fn boot(config: SiteConfig, window: &Window, document: &Document) -> Result<WebExperience, ExperienceError> {
    let canvas = document
        .get_element_by_id(&config.canvas_id)
        .ok_or_else(|| ExperienceError::Dom(format!("a canvas with id `{}`", config.canvas_id)))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| ExperienceError::Dom(format!("`#{}` to be a canvas", config.canvas_id)))?;

    let (width, height, pixel_ratio) = window_size(window);
    let backend = GpuBackend::new(
        wgpu::SurfaceTarget::Canvas(canvas.clone()),
        ((width as f32 * pixel_ratio) as u32).max(1),
        ((height as f32 * pixel_ratio) as u32).max(1),
    )
    .await
    .map_err(|e| ExperienceError::Render(e.to_string()))?;

    let surface = WebSurface {
        canvas,
        backend,
        videos: HashMap::new(),
    };
    let manifest = config.assets.clone();
    let public_dir = config.public_dir.clone();
    let decoder_url = config
        .decoder_path
        .as_deref()
        .map(|dir| asset_url(&config.public_dir, dir));
    let error_selector = config.error_selector.clone();
    let toggle_selector = config.theme_toggle_selector.clone();

    let shared: Shared = Rc::new(RefCell::new(Experience::new(
        config,
        width,
        height,
        pixel_ratio,
        surface,
    )?));

    mirror_into_dom(&shared, document, &error_selector);
    add_listeners(&shared, window, document, &toggle_selector)?;
    for source in &manifest {
        load_asset(&shared, document, &public_dir, decoder_url.as_deref(), source)?;
    }
    start_loop(shared.clone(), document, &error_selector);

    log::info!("Roomfolio experience started");
    Ok(WebExperience { inner: shared })
}

// ── DOM ──

fn to_js(e: ExperienceError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn window_size(window: &Window) -> (u32, u32, f32) {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(1.0) as u32;
    (
        dim(window.inner_width()),
        dim(window.inner_height()),
        window.device_pixel_ratio() as f32,
    )
}

fn set_state(document: &Document, state: &str) {
    if let Some(body) = document.body() {
        let _ = body.set_attribute("data-experience-state", state);
    }
}

fn show_error(document: &Document, selector: &str, error: &ExperienceError) {
    set_state(document, "error");
    match document.query_selector(selector) {
        Ok(Some(el)) => el.set_text_content(Some(&error.to_string())),
        _ => log::warn!("No element matches `{selector}` to show the error in"),
    }
}

/// Keep `<body>` attributes in step with the experience.
fn mirror_into_dom(shared: &Shared, document: &Document, error_selector: &str) {
    let mut exp = shared.borrow_mut();

    if let Some(body) = document.body() {
        let _ = body.set_attribute("data-theme", exp.theme().as_str());
    }
    let doc = document.clone();
    exp.on_theme_switch.subscribe(move |theme: &Theme| {
        if let Some(body) = doc.body() {
            let _ = body.set_attribute("data-theme", theme.as_str());
        }
    });

    let doc = document.clone();
    let selector = error_selector.to_string();
    exp.on_error
        .subscribe(move |error: &ExperienceError| show_error(&doc, &selector, error));
}

fn listen<E: FromWasmAbi + 'static>(
    target: &web_sys::EventTarget,
    event: &str,
    passive: bool,
    handler: impl FnMut(E) + 'static,
) -> Result<(), ExperienceError> {
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    target
        .add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(|e| ExperienceError::Dom(format!("a `{event}` listener: {}", describe(&e))))?;
    // Listeners live as long as the page.
    closure.forget();
    Ok(())
}

fn add_listeners(
    shared: &Shared,
    window: &Window,
    document: &Document,
    toggle_selector: &str,
) -> Result<(), ExperienceError> {
    let exp = shared.clone();
    let win = window.clone();
    listen(window, "resize", true, move |_: web_sys::Event| {
        let (w, h, pr) = window_size(&win);
        if let Ok(mut exp) = exp.try_borrow_mut() {
            exp.resize(w, h, pr);
        }
    })?;

    let exp = shared.clone();
    listen(window, "mousemove", true, move |e: web_sys::MouseEvent| {
        if let Ok(mut exp) = exp.try_borrow_mut() {
            exp.pointer_move(e.client_x() as f32, e.client_y() as f32);
        }
    })?;

    let exp = shared.clone();
    listen(window, "wheel", true, move |e: web_sys::WheelEvent| {
        if let Ok(mut exp) = exp.try_borrow_mut() {
            exp.wheel(e.delta_y() as f32);
        }
    })?;

    let exp = shared.clone();
    listen(window, "touchstart", true, move |e: web_sys::TouchEvent| {
        if let (Some(touch), Ok(mut exp)) = (e.touches().get(0), exp.try_borrow_mut()) {
            exp.touch_start(touch.client_y() as f32);
        }
    })?;

    let exp = shared.clone();
    listen(window, "touchmove", true, move |e: web_sys::TouchEvent| {
        if let (Some(touch), Ok(mut exp)) = (e.touches().get(0), exp.try_borrow_mut()) {
            exp.touch_move(touch.client_y() as f32);
        }
    })?;

    match document.query_selector(toggle_selector) {
        Ok(Some(toggle)) => {
            let exp = shared.clone();
            listen(&toggle, "click", false, move |_: web_sys::MouseEvent| {
                if let Ok(mut exp) = exp.try_borrow_mut() {
                    exp.toggle_theme();
                }
            })?;
        }
        _ => log::warn!("No theme toggle matches `{toggle_selector}`"),
    }
    Ok(())
}

// ── assets ──

fn asset_url(public_dir: &str, path: &str) -> String {
    let dir = public_dir.trim_matches('/');
    if dir.is_empty() {
        path.to_string()
    } else {
        format!("{dir}/{}", path.trim_start_matches('/'))
    }
}

fn load_asset(
    shared: &Shared,
    document: &Document,
    public_dir: &str,
    decoder_url: Option<&str>,
    source: &AssetSource,
) -> Result<(), ExperienceError> {
    let url = asset_url(public_dir, &source.path);
    let name = source.name.clone();
    log::debug!("Loading {} `{name}` from {url}", source.kind.label());
    match source.kind {
        AssetKind::Model => {
            let exp = shared.clone();
            let document = document.clone();
            let decoder_url = decoder_url.map(String::from);
            spawn_local(async move {
                let result = match fetch_bytes(&url).await {
                    Ok(bytes) => decode_model(&document, &bytes, decoder_url.as_deref())
                        .await
                        .map_err(|e| e.to_string()),
                    Err(reason) => Err(reason),
                };
                match exp.try_borrow_mut() {
                    Ok(mut exp) => match result {
                        Ok(model) => exp.asset_loaded(&name, Asset::Model(model)),
                        Err(reason) => exp.asset_failed(&name, &reason),
                    },
                    Err(_) => log::error!("Experience busy, model `{name}` could not be delivered"),
                }
            });
            Ok(())
        }
        AssetKind::VideoTexture => load_video(shared, document, name, &url),
    }
}

/// Decode a fetched model, loading the Draco decoder first when the file needs it.
async fn decode_model(
    document: &Document,
    bytes: &[u8],
    decoder_url: Option<&str>,
) -> Result<RoomModel, ExperienceError> {
    match decoder_url {
        Some(dir) if RoomModel::requires_draco(bytes)? => {
            let mut draco = DracoModule::load(document, dir).await?;
            RoomModel::from_glb_with(bytes, Some(&mut draco))
        }
        _ => RoomModel::from_glb(bytes),
    }
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
    let window = web_sys::window().ok_or("no window")?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| describe(&e))?;
    let response: web_sys::Response = response.dyn_into().map_err(|e| describe(&e))?;
    if !response.ok() {
        return Err(format!("HTTP {} {}", response.status(), response.status_text()));
    }
    let buffer = JsFuture::from(response.array_buffer().map_err(|e| describe(&e))?)
        .await
        .map_err(|e| describe(&e))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Muted, looping, inline `<video>`; registered with the surface up front and
/// reported loaded on its first decoded frame.
fn load_video(shared: &Shared, document: &Document, name: String, url: &str) -> Result<(), ExperienceError> {
    let video = document
        .create_element("video")
        .map_err(|e| ExperienceError::Dom(format!("a video element: {}", describe(&e))))?
        .dyn_into::<HtmlVideoElement>()
        .map_err(|_| ExperienceError::Dom("a video element".into()))?;
    video.set_cross_origin(Some("anonymous"));
    video.set_muted(true);
    video.set_loop(true);
    video.set_autoplay(true);
    let _ = video.set_attribute("playsinline", "");
    video.set_src(url);

    shared
        .try_borrow_mut()
        .map_err(|_| ExperienceError::asset(&name, "experience busy while registering video"))?
        .surface_mut()
        .register_video(&name, video.clone());

    let once = AddEventListenerOptions::new();
    once.set_once(true);

    let exp = shared.clone();
    let loaded_name = name.clone();
    let element = video.clone();
    let on_loaded = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
        let info = VideoInfo {
            width: element.video_width(),
            height: element.video_height(),
        };
        if let Ok(mut exp) = exp.try_borrow_mut() {
            exp.asset_loaded(&loaded_name, Asset::Video(info));
        }
        if let Ok(promise) = element.play() {
            spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::warn!("Video playback refused: {}", describe(&e));
                }
            });
        }
    });

    let exp = shared.clone();
    let failed_name = name;
    let on_error = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
        if let Ok(mut exp) = exp.try_borrow_mut() {
            exp.asset_failed(&failed_name, "video could not be loaded");
        }
    });

    for (event, closure) in [("loadeddata", &on_loaded), ("error", &on_error)] {
        video
            .add_event_listener_with_callback_and_add_event_listener_options(
                event,
                closure.as_ref().unchecked_ref(),
                &once,
            )
            .map_err(|e| ExperienceError::Dom(format!("a `{event}` listener: {}", describe(&e))))?;
    }
    on_loaded.forget();
    on_error.forget();
    video.load();
    Ok(())
}

// ── frame loop ──

fn read_scroll(window: &Window, sections: &[Option<Element>]) -> ScrollProgress {
    let viewport_height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0) as f32;
    let mut progress = [0.0; 3];
    for (slot, section) in progress.iter_mut().zip(sections) {
        if let Some(el) = section {
            let rect = el.get_bounding_client_rect();
            *slot = section_progress(rect.top() as f32, rect.height() as f32, viewport_height);
        }
    }
    ScrollProgress::new(progress)
}

fn start_loop(shared: Shared, document: &Document, error_selector: &str) {
    let sections: Vec<Option<Element>> = SECTION_NAMES
        .iter()
        .map(|name| {
            let found = document
                .query_selector(&format!("[data-scroll-section=\"{name}\"]"))
                .ok()
                .flatten();
            if found.is_none() {
                log::warn!("Section `{name}` is missing from the page");
            }
            found
        })
        .collect();

    let doc = document.clone();
    let selector = error_selector.to_string();
    let mut shown_state = "loading";

    let tick: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let next = tick.clone();
    *tick.borrow_mut() = Some(Closure::new(move |now: f64| {
        let Some(window) = web_sys::window() else {
            return;
        };
        let keep_going = match shared.try_borrow_mut() {
            Ok(mut exp) => {
                exp.set_scroll(read_scroll(&window, &sections));
                let result = exp.frame(now);
                let state = exp.status().as_str();
                if state != shown_state {
                    set_state(&doc, state);
                    shown_state = state;
                }
                match result {
                    Ok(()) => !matches!(exp.status(), ExperienceStatus::Failed(_)),
                    Err(e) => {
                        show_error(&doc, &selector, &e);
                        false
                    }
                }
            }
            // Busy inside a JS callback; try again next frame.
            Err(_) => true,
        };
        if keep_going {
            if let Some(cb) = next.borrow().as_ref() {
                let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        } else {
            log::error!("Frame loop stopped");
        }
    }));

    if let (Some(window), Some(cb)) = (web_sys::window(), tick.borrow().as_ref()) {
        let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
