//! Render build actions as a ninja build file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rustle_rustc::rules::escape_value;
use rustle_rustc::{Rule, RuleTemplates};

use crate::action::BuildAction;

/// Render `actions` and the rules they use as ninja text.
///
/// Rules are declared in [`Rule::ALL`] order, only when some action uses
/// them. Build edges keep the order of `actions`. Each edge also depends on
/// the tool binary its rule runs.
pub fn write_graph(templates: &RuleTemplates, actions: &[BuildAction]) -> String {
    let used: BTreeSet<Rule> = actions.iter().map(|a| a.rule).collect();
    let mut lines: Vec<String> = Vec::new();

    for rule in Rule::ALL.into_iter().filter(|r| used.contains(r)) {
        let params = templates.params(rule);
        lines.push(format!("rule {rule}"));
        lines.push(format!("  command = {}", params.command));
        lines.push("  description = $description".to_owned());
        for (key, value) in [
            ("depfile", params.depfile),
            ("deps", params.deps),
            ("rspfile", params.rspfile),
            ("rspfile_content", params.rspfile_content),
        ] {
            if let Some(value) = value {
                lines.push(format!("  {key} = {value}"));
            }
        }
        lines.push(String::new());
    }

    for action in actions {
        let command_deps: Vec<PathBuf> = templates
            .params(action.rule)
            .command_deps
            .into_iter()
            .map(Path::to_path_buf)
            .collect();

        let mut edge = format!("build {}", escape_path(&action.output));
        push_group(&mut edge, "|", &action.implicit_outputs);
        edge.push_str(&format!(": {}", action.rule));
        for input in &action.inputs {
            edge.push(' ');
            edge.push_str(&escape_path(input));
        }
        let implicits: Vec<PathBuf> = action
            .implicits
            .iter()
            .cloned()
            .chain(command_deps)
            .collect();
        push_group(&mut edge, "|", &implicits);
        lines.push(edge);

        lines.push(format!("  description = {}", escape_value(&action.description)));
        for (name, value) in &action.args {
            lines.push(format!("  {name} = {}", escape_value(value)));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn push_group(edge: &mut String, separator: &str, paths: &[PathBuf]) {
    if paths.is_empty() {
        return;
    }
    edge.push(' ');
    edge.push_str(separator);
    for path in paths {
        edge.push(' ');
        edge.push_str(&escape_path(path));
    }
}

/// Escape a path for a build line, where `$`, space, and `:` are syntax.
fn escape_path(path: &Path) -> String {
    let mut out = String::new();
    for c in path.display().to_string().chars() {
        if matches!(c, '$' | ' ' | ':') {
            out.push('$');
        }
        out.push(c);
    }
    out
}
