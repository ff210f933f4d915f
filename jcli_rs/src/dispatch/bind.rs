//! The argument binding loop.
//!
//! Consumes the token stream left over after resolution and fills the command
//! instance through the specs' binder closures. Ordering rules live here:
//! positional cursor advancement, the boolean peek rule, verbatim raw-tail
//! capture after `---`, and the required-argument checks (named first, then
//! positionals).

use std::any::Any;

use crate::command::{CommandDescriptor, flag_display};
use crate::error::InvokeError;
use crate::token::{ArgumentToken, TokenStream};

pub(crate) fn bind_arguments(
    descriptor: &CommandDescriptor,
    instance: &mut dyn Any,
    stream: &mut TokenStream,
) -> Result<(), InvokeError> {
    let mut observed_named = vec![false; descriptor.named.len()];
    let mut observed_positional = vec![false; descriptor.positional.len()];
    let mut cursor = 0usize;

    loop {
        match stream.peek() {
            ArgumentToken::Eof => break,

            ArgumentToken::Text(value) => {
                stream.advance();
                let Some(spec) = descriptor.positional.get(cursor) else {
                    return Err(InvokeError::StrayPositionalArgument { token: value });
                };
                (spec.bind)(instance, &value).map_err(|e| {
                    InvokeError::BindingValidationFailure {
                        argument: spec.name.clone(),
                        message: e.to_string(),
                    }
                })?;
                observed_positional[cursor] = true;
                cursor += 1;
            }

            // "---": everything after it is the raw tail, captured verbatim
            // (or discarded when no sink is declared), never bound.
            ArgumentToken::LongHand(name) if name == "-" => {
                stream.advance();
                let tail = stream.take_raw_tail();
                if let Some(sink) = &descriptor.raw_sink {
                    sink(instance, tail);
                }
                break;
            }

            ArgumentToken::LongHand(name) | ArgumentToken::ShortHand(name) => {
                let shorthand = matches!(stream.peek(), ArgumentToken::ShortHand(_));
                stream.advance();
                let typed = if shorthand {
                    format!("-{name}")
                } else {
                    format!("--{name}")
                };
                let Some(index) = descriptor.find_named(&name, shorthand) else {
                    return Err(InvokeError::UnknownNamedArgument { name: typed });
                };
                observed_named[index] = true;
                let spec = &descriptor.named[index];

                let bound = if spec.boolean {
                    match stream.peek() {
                        ArgumentToken::Text(v) if v == "true" || v == "false" => {
                            stream.advance();
                            (spec.bind)(instance, &v)
                        }
                        // No explicit value: the flag itself means true and
                        // the peeked token stays for the next iteration.
                        _ => (spec.bind)(instance, "true"),
                    }
                } else {
                    match stream.advance_word() {
                        None => {
                            return Err(InvokeError::MissingValueForNamedArgument { name: typed });
                        }
                        Some(word) => {
                            let word = word.to_string();
                            (spec.bind)(instance, &word)
                        }
                    }
                };
                bound.map_err(|e| InvokeError::BindingValidationFailure {
                    argument: typed,
                    message: e.to_string(),
                })?;
            }
        }
    }

    // Named arguments are checked first and reported alone; positionals are
    // only reported when no named argument is missing.
    let missing_named: Vec<String> = descriptor
        .named
        .iter()
        .zip(&observed_named)
        .filter(|(spec, seen)| spec.required && !**seen)
        .map(|(spec, _)| flag_display(&spec.aliases[0]))
        .collect();
    if !missing_named.is_empty() {
        return Err(InvokeError::MissingRequiredArguments {
            names: missing_named,
        });
    }

    let missing_positional: Vec<String> = descriptor
        .positional
        .iter()
        .zip(&observed_positional)
        .filter(|(spec, seen)| spec.required && !**seen)
        .map(|(spec, _)| format!("[{}] {}", spec.position, spec.name))
        .collect();
    if !missing_positional.is_empty() {
        return Err(InvokeError::MissingRequiredArguments {
            names: missing_positional,
        });
    }

    Ok(())
}
