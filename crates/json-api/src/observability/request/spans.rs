//! Route templates for span fields and metric labels.

/// Collapse record ids in `path` so per-record requests share one label.
pub(super) fn route_template(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut template = String::from("/");

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            template.push('/');
        }

        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            template.push_str("{id}");
        } else {
            template.push_str(segment);
        }
    }

    template
}
