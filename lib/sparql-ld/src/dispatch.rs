use reqwest::Url;
use sparql_ld_model::{Identifier, SourceFormat};

/// Maps file extensions to formats. The first matching entry wins.
const EXTENSIONS: [(&str, SourceFormat); 6] = [
    (".ntriples", SourceFormat::NTriples),
    (".nt", SourceFormat::NTriples),
    (".n3", SourceFormat::N3),
    (".jsonld", SourceFormat::JsonLd),
    (".json", SourceFormat::JsonLd),
    (".jsod", SourceFormat::JsonLd),
];

/// Maps media types to formats.
const MEDIA_TYPES: [(&str, SourceFormat); 7] = [
    ("text/html", SourceFormat::Html),
    ("application/xhtml+xml", SourceFormat::Html),
    ("application/ld+json", SourceFormat::JsonLd),
    ("application/json", SourceFormat::JsonLd),
    ("application/json+ld", SourceFormat::JsonLd),
    ("application/n-triples", SourceFormat::NTriples),
    ("text/n3", SourceFormat::N3),
];

/// Selects the parsing strategy for a dereferenced document.
///
/// The file extension of the identifier takes priority over the content type announced by the
/// server, as the headers of arbitrary web servers are frequently missing or wrong.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormatDispatcher;

impl FormatDispatcher {
    /// Selects the format for `identifier`, falling back to `content_type` if the identifier has no
    /// known extension.
    pub fn select_format(identifier: &Identifier, content_type: &str) -> SourceFormat {
        Self::format_from_extension(identifier)
            .unwrap_or_else(|| Self::format_from_content_type(content_type))
    }

    /// Returns the format implied by the extension of the last path segment of `identifier`.
    ///
    /// Query and fragment are ignored. If the identifier is not a URL, the whole text is used.
    pub fn format_from_extension(identifier: &Identifier) -> Option<SourceFormat> {
        let segment = match Url::parse(identifier.as_str()) {
            Ok(url) => url.path().rsplit('/').next().unwrap_or_default().to_lowercase(),
            Err(_) => identifier.folded().to_owned(),
        };
        EXTENSIONS
            .iter()
            .find(|(extension, _)| segment.ends_with(extension))
            .map(|(_, format)| *format)
    }

    /// Returns the format implied by `content_type`.
    ///
    /// Unknown and empty content types select [SourceFormat::Auto].
    pub fn format_from_content_type(content_type: &str) -> SourceFormat {
        let essence = media_type_essence(content_type);
        MEDIA_TYPES
            .iter()
            .find(|(media_type, _)| *media_type == essence)
            .map_or(SourceFormat::Auto, |(_, format)| *format)
    }
}

/// Strips the parameters of a media type and normalizes its case.
///
/// For example, `Text/HTML; charset=UTF-8` becomes `text/html`.
pub(crate) fn media_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
