//! Draco geometry through the JavaScript decoder shipped in the site's
//! `decoder_path` directory.

use js_sys::{Array, Float32Array, Function, Int8Array, Object, Promise, Reflect, Uint32Array};
use roomfolio_gpu_shared::frame::MeshData;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlScriptElement, Node};

use crate::error::ExperienceError;
use crate::model::{DracoAttributes, DracoDecoder, DRACO_DECODER_SCRIPT as DECODER_SCRIPT};

/// Global the decoder script defines.
const MODULE_FACTORY: &str = "DracoDecoderModule";

/// An instantiated decoder module.
pub struct DracoModule {
    draco: JsValue,
}

impl DracoModule {
    /// Load the decoder script from `dir_url` (once per page) and instantiate it.
    pub async fn load(document: &Document, dir_url: &str) -> Result<Self, ExperienceError> {
        let global = js_sys::global();
        let defined = Reflect::has(&global, &MODULE_FACTORY.into()).unwrap_or(false);
        if !defined {
            let src = format!("{}/{DECODER_SCRIPT}", dir_url.trim_end_matches('/'));
            inject_script(document, &src).await?;
        }

        let factory: Function = get(&global, MODULE_FACTORY)?
            .dyn_into()
            .map_err(|_| decoder_error(format!("{DECODER_SCRIPT} did not define {MODULE_FACTORY}")))?;

        // The module is wrapped so the promise does not adopt it as a thenable.
        let ready = Promise::new(&mut |resolve, reject| {
            let config = Object::new();
            let on_loaded = Closure::once_into_js(move |draco: JsValue| {
                let wrapper = Object::new();
                let _ = Reflect::set(&wrapper, &"draco".into(), &draco);
                let _ = resolve.call1(&JsValue::NULL, &wrapper);
            });
            let _ = Reflect::set(&config, &"onModuleLoaded".into(), &on_loaded);
            if let Err(e) = factory.call1(&JsValue::NULL, &config) {
                let _ = reject.call1(&JsValue::NULL, &e);
            }
        });
        let wrapper = JsFuture::from(ready)
            .await
            .map_err(|e| decoder_error(format!("instantiation failed: {}", describe(&e))))?;
        let draco = get(&wrapper, "draco")?;
        log::info!("Draco decoder loaded from {dir_url}");
        Ok(Self { draco })
    }

    fn decode_into(
        &self,
        decoder: &JsValue,
        mesh: &JsValue,
        compressed: &[u8],
        attributes: &DracoAttributes,
    ) -> Result<MeshData, ExperienceError> {
        let signed: Vec<i8> = compressed.iter().map(|&b| b as i8).collect();
        let array = Int8Array::from(signed.as_slice());
        let status = call(
            decoder,
            "DecodeArrayToMesh",
            &[array.into(), JsValue::from(compressed.len() as u32), mesh.clone()],
        )?;
        if !call(&status, "ok", &[])?.as_bool().unwrap_or(false) {
            let message = call(&status, "error_msg", &[])
                .ok()
                .and_then(|m| m.as_string())
                .unwrap_or_default();
            return Err(decoder_error(format!("decoding failed: {message}")));
        }

        let positions = self.attribute(decoder, mesh, attributes.position)?;
        let normals = match attributes.normal {
            Some(id) => self.attribute(decoder, mesh, id)?,
            None => Vec::new(),
        };
        let uvs = match attributes.uv {
            Some(id) => self.attribute(decoder, mesh, id)?,
            None => Vec::new(),
        };
        Ok(MeshData {
            positions,
            normals,
            uvs,
            indices: self.indices(decoder, mesh)?,
        })
    }

    /// Every point's value of one attribute, as `f32`.
    fn attribute(&self, decoder: &JsValue, mesh: &JsValue, id: u32) -> Result<Vec<f32>, ExperienceError> {
        let attribute = call(decoder, "GetAttributeByUniqueId", &[mesh.clone(), id.into()])?;
        if number(&get(&attribute, "ptr")?)? == 0.0 {
            return Err(decoder_error(format!("no attribute with id {id}")));
        }
        let components = number(&call(&attribute, "num_components", &[])?)? as u32;
        let points = number(&call(mesh, "num_points", &[])?)? as u32;
        let values = components * points;
        let byte_length = values * 4;

        let ptr = self.malloc(byte_length)?;
        let data_type = get(&self.draco, "DT_FLOAT32")?;
        let copied = call(
            decoder,
            "GetAttributeDataArrayForAllPoints",
            &[mesh.clone(), attribute, data_type, byte_length.into(), ptr.into()],
        )
        .and_then(|_| {
            let heap = get(&get(&self.draco, "HEAPF32")?, "buffer")?;
            Ok(Float32Array::new_with_byte_offset_and_length(&heap, ptr, values).to_vec())
        });
        self.free(ptr);
        copied
    }

    fn indices(&self, decoder: &JsValue, mesh: &JsValue) -> Result<Vec<u32>, ExperienceError> {
        let faces = number(&call(mesh, "num_faces", &[])?)? as u32;
        let count = faces * 3;
        let byte_length = count * 4;

        let ptr = self.malloc(byte_length)?;
        let copied = call(
            decoder,
            "GetTrianglesUInt32Array",
            &[mesh.clone(), byte_length.into(), ptr.into()],
        )
        .and_then(|_| {
            let heap = get(&get(&self.draco, "HEAPF32")?, "buffer")?;
            Ok(Uint32Array::new_with_byte_offset_and_length(&heap, ptr, count).to_vec())
        });
        self.free(ptr);
        copied
    }

    fn malloc(&self, bytes: u32) -> Result<u32, ExperienceError> {
        Ok(number(&call(&self.draco, "_malloc", &[bytes.into()])?)? as u32)
    }

    fn free(&self, ptr: u32) {
        if let Err(e) = call(&self.draco, "_free", &[ptr.into()]) {
            log::warn!("{e}");
        }
    }
}

impl DracoDecoder for DracoModule {
    fn decode(
        &mut self,
        compressed: &[u8],
        attributes: &DracoAttributes,
    ) -> Result<MeshData, ExperienceError> {
        let decoder = construct(&self.draco, "Decoder")?;
        let mesh = construct(&self.draco, "Mesh")?;
        let result = self.decode_into(&decoder, &mesh, compressed, attributes);
        let _ = call(&self.draco, "destroy", &[mesh]);
        let _ = call(&self.draco, "destroy", &[decoder]);
        result
    }
}

async fn inject_script(document: &Document, src: &str) -> Result<(), ExperienceError> {
    let script: HtmlScriptElement = document
        .create_element("script")
        .map_err(|e| ExperienceError::Dom(format!("a script element: {}", describe(&e))))?
        .dyn_into()
        .map_err(|_| ExperienceError::Dom("a script element".into()))?;
    script.set_src(src);

    let loaded = Promise::new(&mut |resolve, reject| {
        script.set_onload(Some(&resolve));
        script.set_onerror(Some(&reject));
    });

    let parent: Node = match (document.head(), document.body()) {
        (Some(head), _) => head.into(),
        (None, Some(body)) => body.into(),
        (None, None) => return Err(ExperienceError::Dom("a <head> or <body> element".into())),
    };
    parent
        .append_child(&script)
        .map_err(|e| ExperienceError::Dom(format!("room for a script: {}", describe(&e))))?;

    JsFuture::from(loaded)
        .await
        .map_err(|_| decoder_error(format!("could not load {src}")))?;
    Ok(())
}

// ── reflection helpers ──

fn decoder_error(message: impl AsRef<str>) -> ExperienceError {
    ExperienceError::Model(format!("Draco decoder: {}", message.as_ref()))
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn get(target: &JsValue, key: &str) -> Result<JsValue, ExperienceError> {
    Reflect::get(target, &key.into()).map_err(|e| decoder_error(format!("`{key}`: {}", describe(&e))))
}

fn call(target: &JsValue, method: &str, args: &[JsValue]) -> Result<JsValue, ExperienceError> {
    let function: Function = get(target, method)?
        .dyn_into()
        .map_err(|_| decoder_error(format!("`{method}` is not a function")))?;
    let args: Array = args.iter().collect();
    function
        .apply(target, &args)
        .map_err(|e| decoder_error(format!("`{method}`: {}", describe(&e))))
}

fn construct(module: &JsValue, class: &str) -> Result<JsValue, ExperienceError> {
    let constructor: Function = get(module, class)?
        .dyn_into()
        .map_err(|_| decoder_error(format!("`{class}` is not a constructor")))?;
    Reflect::construct(&constructor, &Array::new())
        .map_err(|e| decoder_error(format!("new {class}: {}", describe(&e))))
}

fn number(value: &JsValue) -> Result<f64, ExperienceError> {
    value
        .as_f64()
        .ok_or_else(|| decoder_error(format!("expected a number, got {}", describe(value))))
}
