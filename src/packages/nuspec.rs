use quick_xml::events::Event;
use quick_xml::Reader;

/// Every `targetFramework` attribute declared in a `.nuspec` document
/// (dependency groups, framework assembly groups, ...), deduplicated in
/// document order. Malformed documents yield what was read before the error.
pub fn target_frameworks(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut tags: Vec<String> = Vec::new();
    loop {
        let element = match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => e,
            Ok(Event::Eof) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "malformed nuspec");
                break;
            }
        };

        for attr in element.attributes().flatten() {
            if attr.key.local_name().as_ref() != b"targetFramework" {
                continue;
            }
            if let Ok(value) = attr.unescape_value() {
                let value = value.trim();
                if !value.is_empty() && !tags.iter().any(|t| t == value) {
                    tags.push(value.to_string());
                }
            }
        }
    }
    tags
}
