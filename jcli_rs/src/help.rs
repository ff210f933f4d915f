//! Help-text rendering.
//!
//! Turns the structured argument metadata of a descriptor into human text,
//! and (pattern, description) pairs into candidate-command listings. Pure
//! string building; the pipeline decides where the text goes.

use std::sync::Arc;

use crate::command::{CommandDescriptor, flag_display};

/// Render the full help text for one command.
pub fn render_command_help(descriptor: &CommandDescriptor) -> String {
    let name = descriptor.display_name();
    let mut help = String::new();

    help.push_str(&format!("{} - {}\n\n", name, descriptor.description));

    help.push_str("USAGE:\n    ");
    help.push_str(name);
    if !descriptor.named.is_empty() {
        help.push_str(" [OPTIONS]");
    }
    for spec in &descriptor.positional {
        if spec.required {
            help.push_str(&format!(" <{}>", spec.name));
        } else {
            help.push_str(&format!(" [{}]", spec.name));
        }
    }
    if descriptor.raw_sink.is_some() {
        help.push_str(" [--- raw args...]");
    }
    help.push('\n');

    let alternatives: Vec<&str> = descriptor.alternatives().collect();
    if alternatives.len() > 1 {
        help.push_str("\nALIASES:\n");
        help.push_str(&format!("    {}\n", alternatives.join(", ")));
    }

    if !descriptor.positional.is_empty() {
        help.push_str("\nARGUMENTS:\n");
        for spec in &descriptor.positional {
            let shown = if spec.required {
                format!("<{}>", spec.name)
            } else {
                format!("[{}]", spec.name)
            };
            help.push_str(&format!("    {:<20} {}\n", shown, spec.description));
        }
    }

    help.push_str("\nOPTIONS:\n");
    for spec in &descriptor.named {
        let flags = spec
            .aliases
            .iter()
            .map(|a| flag_display(a))
            .collect::<Vec<_>>()
            .join(", ");
        let shown = if spec.boolean {
            flags
        } else {
            format!("{flags} <value>")
        };
        let mut line = format!("    {:<20} {}", shown, spec.description);
        if spec.required {
            line.push_str(" (required)");
        }
        line.push('\n');
        help.push_str(&line);
    }
    help.push_str(&format!("    {:<20} Show this help message\n", "-h, --help"));

    help
}

/// Render a candidate-command listing from descriptors, registration order
/// preserved. Used for unknown-command errors and prefix-scoped help.
pub fn render_command_listing(descriptors: &[Arc<CommandDescriptor>]) -> String {
    let mut out = String::from("AVAILABLE COMMANDS:\n");
    if descriptors.is_empty() {
        out.push_str("    (none)\n");
        return out;
    }
    for descriptor in descriptors {
        out.push_str(&format!(
            "    {:<24} {}\n",
            descriptor.pattern, descriptor.description
        ));
    }
    out
}
