use crate::graph::{InstallState, PackageGraph, PackageNode};

/// Renders the outcome tree for one requested package. Returns the subtree
/// success flag and the log lines, uncolored; the caller decides how to
/// colorize them.
pub fn render(graph: &PackageGraph, name: &str) -> (bool, Vec<String>) {
    render_level(graph, &[name.to_string()], "", true)
}

fn render_level(
    graph: &PackageGraph,
    names: &[String],
    prefix: &str,
    is_root: bool,
) -> (bool, Vec<String>) {
    let mut success = true;
    let mut lines = Vec::new();
    for (position, name) in names.iter().enumerate() {
        let last = position + 1 == names.len();
        let (connector, continuation) = if is_root {
            (String::new(), String::new())
        } else if last {
            (format!("{}└── ", prefix), format!("{}    ", prefix))
        } else {
            (format!("{}├── ", prefix), format!("{}|   ", prefix))
        };

        let Some(node) = graph.node_by_name(name) else {
            success = false;
            lines.push(format!("{}{}: Failed: unresolved package name", connector, name));
            continue;
        };

        let (subtree_ok, subtree_lines) = if node.dependencies.is_empty() {
            (true, Vec::new())
        } else {
            render_level(graph, &node.dependencies, &continuation, false)
        };

        let outcome = if !subtree_ok {
            success = false;
            match &node.error {
                Some(e) => format!("Dependency Failed: {}", e),
                None => "Dependency Failed: a required dependency was not installed".to_string(),
            }
        } else if let Some(e) = &node.error {
            success = false;
            format!("Failed: {}", e)
        } else {
            outcome_label(node.state).to_string()
        };

        lines.push(format!("{}{}", connector, format_entry(node, &outcome, &continuation)));
        lines.extend(subtree_lines);
    }
    (success, lines)
}

fn outcome_label(state: InstallState) -> &'static str {
    match state {
        InstallState::SameVersionInstalled => "Skipped",
        InstallState::FreshlyInstalled => "Successfully installed",
        InstallState::Reinstalled => "Successfully reinstalled",
        InstallState::NotInstalled | InstallState::DifferentVersionInstalled => "Not installed",
        InstallState::InstallFailed | InstallState::DependencyFailed => "Failed",
    }
}

// multi-line outcome text lines up under the first line, past the
// `<name> <version>: ` column
fn format_entry(node: &PackageNode, outcome: &str, continuation: &str) -> String {
    let head = match &node.version {
        Some(version) => format!("{} {}: ", node.name, version),
        None => format!("{}: ", node.name),
    };
    let pad = " ".repeat(head.len());
    let mut parts = outcome.split('\n');
    let mut entry = format!("{}{}", head, parts.next().unwrap_or(""));
    for part in parts {
        entry.push('\n');
        entry.push_str(continuation);
        entry.push_str(&pad);
        entry.push_str(part);
    }
    entry
}
