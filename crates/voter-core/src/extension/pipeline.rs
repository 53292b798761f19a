//! Runs extensions in configured order against a shared context.

use super::{Context, ContextValue, Extension, ExtensionError, ExtensionRegistry};

/// Applies each named extension in order and returns the final context.
///
/// Ordering is strictly left to right: an extension sees whatever earlier
/// extensions produced. An unknown name aborts the whole run. Any other
/// failure is logged and leaves the context as it was before that extension.
pub fn run(
    registry: &ExtensionRegistry,
    names: &[String],
    mut context: Context,
) -> Result<Context, ExtensionError> {
    for name in names {
        let extension = registry
            .get(name)
            .ok_or_else(|| ExtensionError::Unknown(name.clone()))?;
        match apply(extension, &context) {
            Ok(updates) => {
                tracing::debug!(extension = %name, keys = ?extension.produces(), "extension applied");
                context.extend(updates);
            }
            Err(e) => tracing::error!(extension = %name, error = %e, "extension failed; skipped"),
        }
    }
    Ok(context)
}

/// Invokes one extension and maps its return value onto its `produces` keys
/// without touching the context.
fn apply(
    extension: &Extension,
    context: &Context,
) -> Result<Vec<(String, ContextValue)>, ExtensionError> {
    let args = extension
        .requires()
        .iter()
        .map(|key| {
            context
                .get(key)
                .cloned()
                .ok_or_else(|| ExtensionError::MissingKey {
                    name: extension.name().to_string(),
                    key: key.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let value = extension
        .call(&args)
        .map_err(|e| ExtensionError::Failed {
            name: extension.name().to_string(),
            reason: format!("{e:#}"),
        })?;

    let produces = extension.produces();
    match produces {
        [] => Ok(Vec::new()),
        [key] => {
            let value = match value {
                ContextValue::List(mut items) if items.len() == 1 => items.remove(0),
                other => other,
            };
            Ok(vec![(key.clone(), value)])
        }
        keys => match value {
            ContextValue::List(items) if items.len() == keys.len() => {
                Ok(keys.iter().cloned().zip(items).collect())
            }
            other => Err(ExtensionError::Arity {
                name: extension.name().to_string(),
                expected: keys.len(),
                got: match other {
                    ContextValue::List(items) => items.len(),
                    _ => 1,
                },
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> ContextValue {
        ContextValue::from(s)
    }

    fn list(items: &[&str]) -> ContextValue {
        ContextValue::List(items.iter().map(|s| text(s)).collect())
    }

    fn registry() -> ExtensionRegistry {
        let mut r = ExtensionRegistry::new();
        r.register(Extension::new("upper_method", &["method"], &["method"], |args| {
            Ok(args[0].as_text().unwrap_or("").to_uppercase().into())
        }));
        r.register(Extension::new("pair", &[], &["a", "b"], |_| Ok(list(&["1", "2"]))));
        r.register(Extension::new("triple", &[], &["a", "b"], |_| {
            Ok(list(&["x", "y", "z"]))
        }));
        r.register(Extension::new("wrapped", &[], &["c"], |_| Ok(list(&["only"]))));
        r.register(Extension::new("whole", &[], &["c"], |_| Ok(list(&["p", "q"]))));
        r.register(Extension::new("sink", &["a"], &[], |_| Ok(text("ignored"))));
        r.register(Extension::new("boom", &[], &["a"], |_| {
            anyhow::bail!("exploded")
        }));
        r.register(Extension::new("copy_a_to_d", &["a"], &["d"], |args| {
            Ok(args[0].clone())
        }));
        r
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn start() -> Context {
        let mut ctx = Context::new();
        ctx.insert("method".into(), text("post"));
        ctx
    }

    #[test]
    fn single_produce_stores_value() {
        let ctx = run(&registry(), &names(&["upper_method"]), start()).unwrap();
        assert_eq!(ctx["method"], text("POST"));
    }

    #[test]
    fn multi_produce_spreads_list() {
        let ctx = run(&registry(), &names(&["pair"]), start()).unwrap();
        assert_eq!(ctx["a"], text("1"));
        assert_eq!(ctx["b"], text("2"));
    }

    #[test]
    fn single_produce_unwraps_one_element_list_only() {
        let ctx = run(&registry(), &names(&["wrapped"]), start()).unwrap();
        assert_eq!(ctx["c"], text("only"));
        let ctx = run(&registry(), &names(&["whole"]), start()).unwrap();
        assert_eq!(ctx["c"], list(&["p", "q"]));
    }

    #[test]
    fn zero_produce_ignores_return_value() {
        let ctx = run(&registry(), &names(&["pair", "sink"]), start()).unwrap();
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn arity_mismatch_drops_only_that_extension() {
        let ctx = run(
            &registry(),
            &names(&["upper_method", "triple", "copy_a_to_d"]),
            start(),
        );
        // copy_a_to_d has no `a` to read because triple was dropped.
        let ctx = ctx.unwrap();
        assert_eq!(ctx["method"], text("POST"));
        assert!(!ctx.contains_key("a"));
        assert!(!ctx.contains_key("d"));

        let ctx = run(
            &registry(),
            &names(&["pair", "triple", "copy_a_to_d"]),
            start(),
        )
        .unwrap();
        assert_eq!(ctx["a"], text("1"));
        assert_eq!(ctx["b"], text("2"));
        assert_eq!(ctx["d"], text("1"));
    }

    #[test]
    fn arity_error_reports_counts() {
        let r = registry();
        let err = apply(r.get("triple").unwrap(), &start()).unwrap_err();
        assert!(matches!(
            err,
            ExtensionError::Arity {
                expected: 2,
                got: 3,
                ..
            }
        ));
    }

    #[test]
    fn failing_extension_is_skipped() {
        let ctx = run(&registry(), &names(&["boom", "upper_method"]), start()).unwrap();
        assert_eq!(ctx["method"], text("POST"));
        assert!(!ctx.contains_key("a"));
    }

    #[test]
    fn unknown_name_aborts() {
        let err = run(&registry(), &names(&["upper_method", "nope"]), start()).unwrap_err();
        assert!(matches!(err, ExtensionError::Unknown(name) if name == "nope"));
    }

    #[test]
    fn later_extensions_see_earlier_output() {
        let ctx = run(&registry(), &names(&["pair", "copy_a_to_d"]), start()).unwrap();
        assert_eq!(ctx["d"], text("1"));
    }

    #[test]
    fn pure_pipeline_is_idempotent() {
        let list = names(&["upper_method", "pair", "copy_a_to_d"]);
        let first = run(&registry(), &list, start()).unwrap();
        let second = run(&registry(), &list, start()).unwrap();
        assert_eq!(first, second);
    }
}
