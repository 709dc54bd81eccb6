/// Type of font metric.
///
/// The reserved names cover everything that can be varied in `MVAR`;
/// clients may carry private metrics through the `Custom` escape.
#[derive(Debug, Clone, PartialEq, Hash, Eq)]
pub enum MetricType {
    /// X height
    XHeight,
    /// Cap height
    CapHeight,
    /// Ascender (design-time ascender for the master)
    Ascender,
    /// Descender (design-time descender for the master)
    Descender,
    /// Italic angle (in degrees, negative for right slant)
    ItalicAngle,
    /// Ascender (to be placed in the `hhea` table)
    HheaAscender,
    /// Descender (to be placed in the `hhea` table)
    HheaDescender,
    /// Line gap (to be placed in the `hhea` table)
    HheaLineGap,
    /// Windows Ascender (to be placed in the `OS/2` table)
    WinAscent,
    /// Windows Descender (to be placed in the `OS/2` table)
    WinDescent,
    /// Typographic Ascender (to be placed in the `OS/2` table)
    TypoAscender,
    /// Typographic Descender (to be placed in the `OS/2` table)
    TypoDescender,
    /// Typographic Line Gap (to be placed in the `OS/2` table)
    TypoLineGap,
    /// Subscript horizontal font size
    SubscriptXSize,
    /// Subscript vertical font size
    SubscriptYSize,
    /// Subscript horizontal offset
    SubscriptXOffset,
    /// Subscript vertical offset
    SubscriptYOffset,
    /// Superscript horizontal font size
    SuperscriptXSize,
    /// Superscript vertical font size
    SuperscriptYSize,
    /// Superscript horizontal offset
    SuperscriptXOffset,
    /// Superscript vertical offset
    SuperscriptYOffset,
    /// Strikeout size
    StrikeoutSize,
    /// Strikeout position
    StrikeoutPosition,
    /// Underline position
    UnderlinePosition,
    /// Underline thickness
    UnderlineThickness,
    /// Caret slope rise (for the `hhea` table)
    HheaCaretSlopeRise,
    /// Caret slope run (for the `hhea` table)
    HheaCaretSlopeRun,
    /// Caret offset (for the `hhea` table)
    HheaCaretOffset,
    /// Custom metric type
    Custom(String),
}

impl From<&str> for MetricType {
    fn from(s: &str) -> Self {
        match s {
            "xHeight" => MetricType::XHeight,
            "capHeight" => MetricType::CapHeight,
            "ascender" => MetricType::Ascender,
            "descender" => MetricType::Descender,
            "italicAngle" => MetricType::ItalicAngle,
            "hheaAscender" => MetricType::HheaAscender,
            "hheaDescender" => MetricType::HheaDescender,
            "hheaLineGap" => MetricType::HheaLineGap,
            "winAscent" => MetricType::WinAscent,
            "winDescent" => MetricType::WinDescent,
            "typoAscender" => MetricType::TypoAscender,
            "typoDescender" => MetricType::TypoDescender,
            "typoLineGap" => MetricType::TypoLineGap,
            "subscriptXSize" => MetricType::SubscriptXSize,
            "subscriptYSize" => MetricType::SubscriptYSize,
            "subscriptXOffset" => MetricType::SubscriptXOffset,
            "subscriptYOffset" => MetricType::SubscriptYOffset,
            "superscriptXSize" => MetricType::SuperscriptXSize,
            "superscriptYSize" => MetricType::SuperscriptYSize,
            "superscriptXOffset" => MetricType::SuperscriptXOffset,
            "superscriptYOffset" => MetricType::SuperscriptYOffset,
            "strikeoutSize" => MetricType::StrikeoutSize,
            "strikeoutPosition" => MetricType::StrikeoutPosition,
            "underlinePosition" => MetricType::UnderlinePosition,
            "underlineThickness" => MetricType::UnderlineThickness,
            "hheaCaretSlopeRise" => MetricType::HheaCaretSlopeRise,
            "hheaCaretSlopeRun" => MetricType::HheaCaretSlopeRun,
            "hheaCaretOffset" => MetricType::HheaCaretOffset,
            custom => MetricType::Custom(custom.to_string()),
        }
    }
}

impl MetricType {
    /// The name of the metric, as persisted.
    pub fn as_str(&self) -> &str {
        match self {
            MetricType::XHeight => "xHeight",
            MetricType::CapHeight => "capHeight",
            MetricType::Ascender => "ascender",
            MetricType::Descender => "descender",
            MetricType::ItalicAngle => "italicAngle",
            MetricType::HheaAscender => "hheaAscender",
            MetricType::HheaDescender => "hheaDescender",
            MetricType::HheaLineGap => "hheaLineGap",
            MetricType::WinAscent => "winAscent",
            MetricType::WinDescent => "winDescent",
            MetricType::TypoAscender => "typoAscender",
            MetricType::TypoDescender => "typoDescender",
            MetricType::TypoLineGap => "typoLineGap",
            MetricType::SubscriptXSize => "subscriptXSize",
            MetricType::SubscriptYSize => "subscriptYSize",
            MetricType::SubscriptXOffset => "subscriptXOffset",
            MetricType::SubscriptYOffset => "subscriptYOffset",
            MetricType::SuperscriptXSize => "superscriptXSize",
            MetricType::SuperscriptYSize => "superscriptYSize",
            MetricType::SuperscriptXOffset => "superscriptXOffset",
            MetricType::SuperscriptYOffset => "superscriptYOffset",
            MetricType::StrikeoutSize => "strikeoutSize",
            MetricType::StrikeoutPosition => "strikeoutPosition",
            MetricType::UnderlinePosition => "underlinePosition",
            MetricType::UnderlineThickness => "underlineThickness",
            MetricType::HheaCaretSlopeRise => "hheaCaretSlopeRise",
            MetricType::HheaCaretSlopeRun => "hheaCaretSlopeRun",
            MetricType::HheaCaretOffset => "hheaCaretOffset",
            MetricType::Custom(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names_round_trip() {
        for name in ["xHeight", "winAscent", "hheaCaretOffset"] {
            assert_eq!(MetricType::from(name).as_str(), name);
        }
    }

    #[test]
    fn test_private_metrics_pass_through() {
        let metric = MetricType::from("com.example.opticalCentre");
        assert_eq!(metric, MetricType::Custom("com.example.opticalCentre".to_string()));
        assert_eq!(metric.as_str(), "com.example.opticalCentre");
    }
}
