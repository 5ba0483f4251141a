// Devcap Plug-and-Play Info
// Parsing of per-unit pnpinfo blobs reported by the kernel

/// Fields extracted from a kernel pnpinfo blob.
///
/// Blobs are space- or semicolon-delimited `key=value` strings such
/// as `vendor=0x046d product=0xc52b release=0x1201`. Only the fields
/// the parent synthesizer consumes are retained; a `_HID` of the
/// literal `none` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PnpInfo {
    vendor: Option<String>,
    product: Option<String>,
    device: Option<String>,
    hid: Option<String>,
}

impl PnpInfo {
    pub fn parse(blob: &str) -> Self {
        let mut info = Self::default();
        for field in blob.split([' ', ';']) {
            let Some((key, value)) = field.split_once('=') else {
                continue;
            };
            match key {
                "vendor" => info.vendor = Some(value.to_string()),
                "product" => info.product = Some(value.to_string()),
                "device" => info.device = Some(value.to_string()),
                "_HID" if value != "none" => info.hid = Some(value.to_string()),
                _ => {}
            }
        }
        info
    }

    pub fn vendor(&self) -> Option<&str> {
        self.vendor.as_deref()
    }

    pub fn product(&self) -> Option<&str> {
        self.product.as_deref()
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    pub fn pnp_id(&self) -> Option<&str> {
        self.hid.as_deref()
    }
}

/// Parse a numeric pnpinfo field the way `strtol(value, NULL, 0)`
/// does: `0x` prefix is hexadecimal, a leading `0` is octal, decimal
/// otherwise. Unparseable input yields 0.
pub fn parse_number(value: &str) -> u32 {
    let s = value.trim();
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (hex, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        (&s[1..], 8)
    } else {
        (s, 10)
    };
    u32::from_str_radix(digits, radix).unwrap_or(0)
}
