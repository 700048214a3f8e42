//! Simplified SLD (Styled Layer Descriptor) raster colour maps.
//!
//! The catalog stores raster styles as a reduced SLD string:
//!
//! ```text
//! <RasterSymbolizer> <ColorMap type="ramp" extended="false"> <ColorMapEntry color="#000000" quantity="0" /> + </ColorMap> </RasterSymbolizer>
//! ```
//!
//! `sld_parse` reads values back by substring search between literal
//! delimiters, so attribute values must be double (or single) quoted and
//! must not contain quotes themselves.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{LmiError, LmiResult};

const ENTRY_MARKER: &str = "ColorMapEntry";
const HEADER_MARKER: &str = "<RasterSymbolizer>";

/// Colour map interpolation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SldType {
    Linear,
    Ramp,
    Gradient,
    Intervals,
    Values,
}

impl SldType {
    pub const ALL: [SldType; 5] = [
        SldType::Linear,
        SldType::Ramp,
        SldType::Gradient,
        SldType::Intervals,
        SldType::Values,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SldType::Linear => "linear",
            SldType::Ramp => "ramp",
            SldType::Gradient => "gradient",
            SldType::Intervals => "intervals",
            SldType::Values => "values",
        }
    }
}

impl fmt::Display for SldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SldType {
    type Err = LmiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                LmiError::Validation(format!(
                    "Unable to create SldStyle. Type must be in \"linear\", \"ramp\", \"gradient\", \"intervals\", \"values\" (got \"{s}\")."
                ))
            })
    }
}

/// One `<ColorMapEntry>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorMapEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<String>,
}

impl ColorMapEntry {
    pub fn new(color: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            quantity: Some(quantity.into()),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_opacity(mut self, opacity: impl Into<String>) -> Self {
        self.opacity = Some(opacity.into());
        self
    }

    /// Attributes in emission order.
    fn attributes(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("color", self.color.as_deref()),
            ("label", self.label.as_deref()),
            ("quantity", self.quantity.as_deref()),
            ("opacity", self.opacity.as_deref()),
        ]
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "color" => self.color = Some(value),
            "label" => self.label = Some(value),
            "quantity" => self.quantity = Some(value),
            "opacity" => self.opacity = Some(value),
            _ => {}
        }
    }
}

/// A raster colour map style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SldStyle {
    #[serde(rename = "type")]
    pub sld_type: SldType,
    #[serde(default)]
    pub extended: bool,
    #[serde(default)]
    pub items: Vec<ColorMapEntry>,
}

impl SldStyle {
    pub fn new(sld_type: SldType, items: Vec<ColorMapEntry>) -> Self {
        Self {
            sld_type,
            extended: false,
            items,
        }
    }
}

/// Serialise a style to the catalog's SLD string format.
pub fn sld_dump(style: &SldStyle) -> String {
    let mut out = format!(
        "{HEADER_MARKER} <ColorMap type=\"{}\" extended=\"{}\"> ",
        style.sld_type, style.extended
    );
    for item in &style.items {
        out.push_str("<ColorMapEntry ");
        for (key, value) in item.attributes() {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                out.push_str(&format!("{key}=\"{value}\" "));
            }
        }
        out.push_str("/> + ");
    }
    out.push_str("</ColorMap> </RasterSymbolizer>");
    out
}

/// Validate a free-form type tag, then serialise.
pub fn sld_dump_raw(sld_type: &str, extended: bool, items: Vec<ColorMapEntry>) -> LmiResult<String> {
    let sld_type = sld_type.parse::<SldType>()?;
    Ok(sld_dump(&SldStyle {
        sld_type,
        extended,
        items,
    }))
}

/// Read a style back from the catalog's SLD string format.
pub fn sld_parse(text: &str) -> LmiResult<SldStyle> {
    let normalized = text.replace('\'', "\"");

    let items = normalized
        .split(ENTRY_MARKER)
        .filter(|chunk| !chunk.contains(HEADER_MARKER))
        .map(|chunk| {
            let chunk = chunk.trim();
            let mut entry = ColorMapEntry::default();
            for key in ["color", "label", "quantity", "opacity"] {
                let value = find_between(chunk, &format!("{key}=\""), "\"");
                if !value.is_empty() {
                    entry.set(key, value.to_string());
                }
            }
            entry
        })
        .collect();

    let sld_type = find_between(&normalized, "type=\"", "\"").parse()?;
    let extended = find_between(&normalized, "extended=\"", "\"").eq_ignore_ascii_case("true");

    Ok(SldStyle {
        sld_type,
        extended,
        items,
    })
}

/// Text between the first `first` and the next `last` after it, or "".
pub fn find_between<'a>(s: &'a str, first: &str, last: &str) -> &'a str {
    let Some(start) = s.find(first).map(|i| i + first.len()) else {
        return "";
    };
    match s[start..].find(last) {
        Some(end) => &s[start..start + end],
        None => "",
    }
}

/// Reject strings that are not well-formed XML before handing them to `sld_parse`.
pub fn validate_xml(text: &str) -> LmiResult<()> {
    let mut reader = Reader::from_str(text);
    let mut depth: i32 = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(LmiError::Validation(format!(
                    "XML parsing error at position {}: {:?}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(LmiError::Validation(format!(
            "XML has {depth} unclosed element(s)"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SldStyle {
        SldStyle {
            sld_type: SldType::Ramp,
            extended: true,
            items: vec![
                ColorMapEntry::new("#000000", "0").with_label("low"),
                ColorMapEntry::new("#ffffff", "100").with_opacity("0.5"),
            ],
        }
    }

    #[test]
    fn test_dump_format() {
        let text = sld_dump(&sample());
        assert_eq!(
            text,
            "<RasterSymbolizer> <ColorMap type=\"ramp\" extended=\"true\"> \
             <ColorMapEntry color=\"#000000\" label=\"low\" quantity=\"0\" /> + \
             <ColorMapEntry color=\"#ffffff\" quantity=\"100\" opacity=\"0.5\" /> + \
             </ColorMap> </RasterSymbolizer>"
        );
    }

    #[test]
    fn test_roundtrip() {
        let style = sample();
        assert_eq!(sld_parse(&sld_dump(&style)).unwrap(), style);
    }

    #[test]
    fn test_parse_single_quotes() {
        let text = "<RasterSymbolizer> <ColorMap type='values' extended='false'> \
                    <ColorMapEntry color='#ff0000' quantity='1'/> </ColorMap> </RasterSymbolizer>";
        let style = sld_parse(text).unwrap();
        assert_eq!(style.sld_type, SldType::Values);
        assert!(!style.extended);
        assert_eq!(style.items, vec![ColorMapEntry::new("#ff0000", "1")]);
    }

    #[test]
    fn test_invalid_type_rejected() {
        let err = sld_dump_raw("rainbow", false, vec![]).unwrap_err();
        assert!(matches!(err, LmiError::Validation(_)));
    }

    #[test]
    fn test_empty_items() {
        let style = SldStyle::new(SldType::Linear, vec![]);
        let parsed = sld_parse(&sld_dump(&style)).unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn test_find_between() {
        assert_eq!(find_between("a=\"1\" b=\"2\"", "b=\"", "\""), "2");
        assert_eq!(find_between("nothing here", "x=\"", "\""), "");
    }

    #[test]
    fn test_validate_xml() {
        assert!(validate_xml(&sld_dump(&sample())).is_ok());
        assert!(validate_xml("<RasterSymbolizer><ColorMap></RasterSymbolizer>").is_err());
    }
}
