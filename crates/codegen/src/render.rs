//! Text payloads to C++ array declarations.
//!
//! Pure 7-bit text is emitted as `uint8_t` code units and wrapped in an
//! external one-byte string resource. Anything else is emitted as UTF-16
//! `uint16_t` code units behind an external two-byte resource.

/// Code unit width chosen for a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    OneByte,
    TwoByte,
}

impl Encoding {
    pub fn width(self) -> u8 {
        match self {
            Encoding::OneByte => 1,
            Encoding::TwoByte => 2,
        }
    }

    /// Values per line in the emitted literal.
    pub fn wrap_step(self) -> usize {
        match self {
            Encoding::OneByte => 20,
            Encoding::TwoByte => 10,
        }
    }
}

/// An encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlob {
    pub encoding: Encoding,
    pub units: Vec<u16>,
}

impl RenderedBlob {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Recover the text the blob was encoded from.
    pub fn decode(&self) -> Result<String, String> {
        match self.encoding {
            Encoding::OneByte => self
                .units
                .iter()
                .map(|&u| {
                    u8::try_from(u)
                        .ok()
                        .filter(u8::is_ascii)
                        .map(char::from)
                        .ok_or_else(|| format!("code unit {} is not ASCII", u))
                })
                .collect(),
            Encoding::TwoByte => String::from_utf16(&self.units).map_err(|e| e.to_string()),
        }
    }
}

/// Pick the narrowest encoding that represents `payload` exactly.
pub fn encode(payload: &str) -> RenderedBlob {
    if payload.is_ascii() {
        RenderedBlob {
            encoding: Encoding::OneByte,
            units: payload.bytes().map(u16::from).collect(),
        }
    } else {
        RenderedBlob {
            encoding: Encoding::TwoByte,
            units: payload.encode_utf16().collect(),
        }
    }
}

/// Comma-separated decimal literal, `step` values per line.
pub fn to_c_array(units: &[u16], step: usize) -> String {
    units
        .chunks(step.max(1))
        .map(|chunk| {
            chunk
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join(",\n")
}

/// Emit the array declaration and resource wrapper for `payload` under the
/// symbol `var`. The backing array is `raw_<var>`.
pub fn render_blob(var: &str, payload: &str) -> String {
    render_encoded(var, &encode(payload))
}

/// [`render_blob`] for a payload that is already encoded.
pub fn render_encoded(var: &str, blob: &RenderedBlob) -> String {
    let data = to_c_array(&blob.units, blob.encoding.wrap_step());
    match blob.encoding {
        Encoding::OneByte => format!(
            r#"
static const uint8_t raw_{var}[] = {{ {data} }};
static struct : public v8::String::ExternalOneByteStringResource {{
  const char* data() const override {{
    return reinterpret_cast<const char*>(raw_{var});
  }}
  size_t length() const override {{ return arraysize(raw_{var}); }}
  void Dispose() override {{ /* Default calls `delete this`. */ }}
  v8::Local<v8::String> ToStringChecked(v8::Isolate* isolate) {{
    if (string_.IsEmpty())
      string_.Set(isolate,
                  v8::String::NewExternalOneByte(isolate, this).ToLocalChecked());
    return string_.Get(isolate);
  }}
  v8::Eternal<v8::String> string_;
}} {var};
"#
        ),
        Encoding::TwoByte => format!(
            r#"
static const uint16_t raw_{var}[] = {{ {data} }};
static struct : public v8::String::ExternalStringResource {{
  const uint16_t* data() const override {{ return raw_{var}; }}
  size_t length() const override {{ return arraysize(raw_{var}); }}
  void Dispose() override {{ /* Default calls `delete this`. */ }}
  v8::Local<v8::String> ToStringChecked(v8::Isolate* isolate) {{
    if (string_.IsEmpty())
      string_.Set(isolate,
                  v8::String::NewExternalTwoByte(isolate, this).ToLocalChecked());
    return string_.Get(isolate);
  }}
  v8::Eternal<v8::String> string_;
}} {var};
"#
        ),
    }
}
