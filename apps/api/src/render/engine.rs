use std::path::PathBuf;

/// PDF engines pandoc can drive, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfEngine {
    Weasyprint,
    Wkhtmltopdf,
    Xelatex,
    Pdflatex,
}

impl PdfEngine {
    pub const DETECTION_ORDER: [PdfEngine; 4] = [
        PdfEngine::Weasyprint,
        PdfEngine::Wkhtmltopdf,
        PdfEngine::Xelatex,
        PdfEngine::Pdflatex,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PdfEngine::Weasyprint => "weasyprint",
            PdfEngine::Wkhtmltopdf => "wkhtmltopdf",
            PdfEngine::Xelatex => "xelatex",
            PdfEngine::Pdflatex => "pdflatex",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::DETECTION_ORDER
            .into_iter()
            .find(|engine| engine.name().eq_ignore_ascii_case(name.trim()))
    }

    /// HTML engines style through the CSS sheet; LaTeX engines through template variables.
    pub fn uses_css(self) -> bool {
        matches!(self, PdfEngine::Weasyprint | PdfEngine::Wkhtmltopdf)
    }

    /// First engine installed on `PATH`.
    pub fn detect() -> Option<Self> {
        Self::DETECTION_ORDER
            .into_iter()
            .find(|engine| find_in_path(engine.name()).is_some())
    }
}

pub fn find_in_path(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Pandoc header for LaTeX engines: keeps CV bullet lists spaced one item per line.
pub const CV_LATEX_HEADER: &str = r"\usepackage{enumitem}
\usepackage{parskip}
\setlist[itemize]{topsep=2pt, partopsep=0pt, parsep=2pt, itemsep=3pt, leftmargin=18pt}
\providecommand{\tightlist}{\setlength{\itemsep}{3pt}\setlength{\parskip}{0pt}}
\setlength{\parskip}{4pt}
";
