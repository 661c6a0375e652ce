use crate::{
    expr::ReadError,
    semant::{CheckDiagnostic, DefinitionError},
    span::{SourceCache, SourceId, Span},
};
use annotate_snippets::{Level, Message, Renderer, Snippet};
use itertools::Itertools;
use std::path::Path;

pub struct DiagManager {
    diags: Vec<Diagnostic>,
}

impl DiagManager {
    pub fn new() -> Self {
        Self { diags: Vec::new() }
    }

    pub fn add_diag(&mut self, diag: Diagnostic) {
        tracing::debug!(code = ?diag.code, "{}", diag.title);
        self.diags.push(diag);
    }

    pub fn add_diags(&mut self, diags: impl IntoIterator<Item = Diagnostic>) {
        for diag in diags {
            self.add_diag(diag);
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.diags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diags.is_empty()
    }

    pub fn diags(&self) -> &[Diagnostic] {
        &self.diags
    }

    pub fn render(&self, sources: &SourceCache, renderer: &Renderer) -> Vec<String> {
        self.diags
            .iter()
            .map(|diag| renderer.render(diag.to_message(sources)).to_string())
            .collect()
    }

    pub fn print_errors(&self, sources: &SourceCache) {
        for rendered in self.render(sources, &Renderer::styled()) {
            println!();
            println!("{rendered}");
        }
    }
}

impl Default for DiagManager {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    title: String,
    code: Option<String>,
    parts: Vec<DiagnosticPart>,
    notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticPart {
    Error(String, Span),
    Info(String, Span),
}

impl DiagnosticPart {
    fn span(&self) -> Span {
        match self {
            DiagnosticPart::Error(_, span) => *span,
            DiagnosticPart::Info(_, span) => *span,
        }
    }
}

impl Diagnostic {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            code: None,
            parts: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn with_error(mut self, msg: &str, span: Span) -> Self {
        self.parts.push(DiagnosticPart::Error(msg.to_string(), span));
        self
    }

    pub fn with_info(mut self, msg: &str, span: Span) -> Self {
        self.parts.push(DiagnosticPart::Info(msg.to_string(), span));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn parts(&self) -> &[DiagnosticPart] {
        &self.parts
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn to_message<'a>(&'a self, sources: &'a SourceCache) -> Message<'a> {
        let mut msg = Level::Error.title(&self.title);
        if let Some(code) = &self.code {
            msg = msg.id(code);
        }

        for (source, parts) in &self.parts.iter().chunk_by(|p| p.span().source()) {
            let Some(text) = sources.get_text(source) else {
                continue;
            };
            let mut snippet = Snippet::source(text)
                .origin(source.name().as_str())
                .fold(true);

            for part in parts {
                snippet = match part {
                    DiagnosticPart::Error(m, span) => {
                        snippet.annotation(Level::Error.span(span.bytes()).label(m))
                    }
                    DiagnosticPart::Info(m, span) => {
                        snippet.annotation(Level::Info.span(span.bytes()).label(m))
                    }
                };
            }

            msg = msg.snippet(snippet);
        }

        for note in &self.notes {
            msg = msg.footer(Level::Note.title(note));
        }

        msg
    }
}

impl Diagnostic {
    /// A checker finding, pointing at the offending node when its span is
    /// known.
    pub fn from_check(diag: &CheckDiagnostic, span: Option<Span>) -> Self {
        let mut res = Diagnostic::new(diag.message()).with_code(diag.code());
        if let Some(span) = span {
            res = res.with_error("", span);
        }
        res.with_note(format!("in `{}`", diag.context()))
    }

    pub fn err_unreadable_file(path: &Path, err: &std::io::Error) -> Self {
        Diagnostic::new(format!("could not read `{}`: {err}", path.display()))
    }

    pub fn err_module_format(source: SourceId, err: &toml::de::Error) -> Self {
        let mut diag = Diagnostic::new("malformed module document");
        match err.span() {
            Some(span) => diag = diag.with_error(err.message(), Span::from_range(source, span)),
            None => diag = diag.with_note(err.message().to_string()),
        }
        diag
    }

    pub fn err_expr_syntax(err: &ReadError, text_start: Span) -> Self {
        let at = text_start.start() + err.offset();
        let span = Span::new(text_start.source(), at, at);
        Diagnostic::new("malformed expression")
            .with_error(&format!("expected {}", err.expected()), span)
    }

    pub fn err_invalid_node(msg: &str, span: Span) -> Self {
        Diagnostic::new(msg).with_error("", span)
    }

    pub fn err_duplicate_label(label: &str, span: Span, previous: Span) -> Self {
        Diagnostic::new(format!("duplicate node label `{label}`"))
            .with_error("", span)
            .with_info("previous declaration", previous)
    }

    pub fn err_definition(err: &DefinitionError, span: Span) -> Self {
        Diagnostic::new(err.to_string()).with_error("", span)
    }

    pub fn err_unknown_import(name: &str, span: Span) -> Self {
        Diagnostic::new(format!("unknown module `{name}`"))
            .with_error("imported here", span)
            .with_note("modules must be checked before the modules importing them")
    }

    pub fn err_module_redeclaration(name: &str, span: Span) -> Self {
        Diagnostic::new(format!("redeclaration of module `{name}`")).with_error("", span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sources(text: &str) -> (SourceCache, SourceId) {
        let mut sources = SourceCache::new(PathBuf::from("."));
        let id = SourceId::new("sets.toml");
        sources.add(id, text.to_string());
        (sources, id)
    }

    #[test]
    fn renders_code_annotation_and_note() {
        let (sources, id) = sources("formula = \"(PREDCON isSet (VAR x))\"\n");
        let diag = Diagnostic::new("unknown predicate constant `isSet` with arity 1")
            .with_code(9204)
            .with_error("", Span::new(id, 11, 34))
            .with_note("in `sets.ax1.formula`");

        let mut diags = DiagManager::new();
        diags.add_diag(diag);
        let rendered = diags.render(&sources, &Renderer::plain());

        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].starts_with("error[9204]: unknown predicate constant"));
        assert!(rendered[0].contains("sets.toml"));
        assert!(rendered[0].contains("in `sets.ax1.formula`"));
    }

    #[test]
    fn parts_in_unknown_sources_are_skipped() {
        let (sources, _) = sources("");
        let diag = Diagnostic::new("lost").with_error("", Span::new(SourceId::new("gone"), 0, 0));

        let rendered = Renderer::plain().render(diag.to_message(&sources)).to_string();
        assert!(rendered.starts_with("error: lost"));
        assert!(!rendered.contains("gone"));
    }

    #[test]
    fn expression_errors_point_into_the_document() {
        let (_, id) = sources("");
        let err = ReadError::new(4, "`)`");
        let diag = Diagnostic::err_expr_syntax(&err, Span::new(id, 10, 10));

        assert_eq!(
            diag.parts(),
            &[DiagnosticPart::Error("expected `)`".into(), Span::new(id, 14, 14))]
        );
    }
}
