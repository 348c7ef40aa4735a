pub const COMPLEXITY_THRESHOLD_BYTES: usize = 15_000;

const RULE: &str = "========================================";

/// Substring counts only; `<g` also matches tags such as `<glyph`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SvgComplexity {
    pub size_bytes: usize,
    pub paths: usize,
    pub polygons: usize,
    pub rects: usize,
    pub circles: usize,
    pub groups: usize,
}

impl SvgComplexity {
    pub fn from_svg(svg: &str) -> Self {
        Self {
            size_bytes: svg.len(),
            paths: svg.matches("<path").count(),
            polygons: svg.matches("<polygon").count(),
            rects: svg.matches("<rect").count(),
            circles: svg.matches("<circle").count(),
            groups: svg.matches("<g").count(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            size_bytes: bytes.len(),
            ..Self::from_svg(&String::from_utf8_lossy(bytes))
        }
    }

    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }

    pub fn is_complex(&self) -> bool {
        self.size_bytes > COMPLEXITY_THRESHOLD_BYTES
    }

    pub fn render_report(&self) -> String {
        let mut lines = vec![
            RULE.to_string(),
            "📊 SVG COMPLEXITY ANALYSIS".to_string(),
            RULE.to_string(),
            format!("File Size : {:.2} KB", self.size_kb()),
            format!(
                "Elements  : {} paths, {} polygons, {} rects, {} circles, {} groups",
                self.paths, self.polygons, self.rects, self.circles, self.groups
            ),
        ];
        if self.is_complex() {
            lines.push("⚠️ WARNING: This SVG is highly complex (> 15 KB).".to_string());
            lines.push("   AI models stream output token-by-token. Reconstructing this".to_string());
            lines.push("   is highly prone to timeouts or hitting maximum token limits.".to_string());
            lines.push("   Try: `morphcli simplify <file>` to ask Gemini to redraw it.".to_string());
        } else {
            lines.push("✅ This SVG is well-optimized for AI transformation!".to_string());
        }
        lines.push(RULE.to_string());
        lines.join("\n")
    }
}
