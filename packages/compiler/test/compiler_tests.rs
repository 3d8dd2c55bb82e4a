/**
 * Compiler Tests
 *
 * End-to-end coverage of the compile/link cycle: matching order, widget
 * ownership, markup and directive processing, scope decisions, cloning,
 * injection and failure isolation.
 */

#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use template_compiler::{
        BehaviorFactory, CollectingExceptionHandler, CompileError, Compiler, CompilerConfig, Dom,
        LinkFn, LocalInjector, NewScope, Registries, Scope, SCOPE_DATA_KEY,
    };

    type Log = Rc<RefCell<Vec<String>>>;

    fn log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn push(log: &Log, entry: impl Into<String>) {
        log.borrow_mut().push(entry.into());
    }

    fn entries(log: &Log) -> Vec<String> {
        log.borrow().clone()
    }

    fn compiler_with(registries: Registries) -> (Compiler, Rc<CollectingExceptionHandler>) {
        let handler = Rc::new(CollectingExceptionHandler::new());
        let compiler =
            Compiler::with_collaborators(registries, Rc::new(LocalInjector), handler.clone());
        (compiler, handler)
    }

    /// Directive that logs `link:<value>` when its node is linked.
    fn logging_directive(registries: &mut Registries, name: &str, log: &Log) {
        let log = log.clone();
        registries.add_directive(
            name,
            BehaviorFactory::direct(move |_api, locals| {
                let log = log.clone();
                let value = locals.value.clone().unwrap_or_default();
                Ok(Some(LinkFn::direct(move |_scope, _element| {
                    push(&log, format!("link:{value}"));
                    Ok(())
                })))
            }),
        );
    }

    mod compile_targets {
        use super::*;

        #[test]
        fn should_leave_an_unmatched_tree_untouched() {
            let (compiler, handler) = compiler_with(Registries::new());
            let linker = compiler.compile("<div><span>text</span></div>").unwrap();
            let scope = Scope::new();
            let bound = linker.link(Some(&scope)).unwrap();
            assert_eq!(bound.outer_html(), "<div><span>text</span></div>");
            assert!(linker.template().is_empty());
            assert!(handler.is_empty());
        }

        #[test]
        fn should_reject_multiple_element_roots() {
            let (compiler, _) = compiler_with(Registries::new());
            let err = compiler
                .compile("<div>a</div><span>b</span>")
                .err()
                .expect("multi-root must not compile");
            match err {
                CompileError::MultipleRoots { markup } => {
                    assert!(markup.contains("<div>a</div>"));
                    assert!(markup.contains("<span>b</span>"));
                }
                other => panic!("expected MultipleRoots, got {other:?}"),
            }
        }

        #[test]
        fn should_include_the_markup_in_the_multi_root_message() {
            let (compiler, _) = compiler_with(Registries::new());
            let err = compiler.compile("text<div></div>").err().unwrap();
            let message = err.to_string();
            assert!(message.starts_with("Cannot compile multiple element roots:"));
            assert!(message.contains("<div></div>"));
        }

        #[test]
        fn should_reject_an_empty_selection() {
            let (compiler, _) = compiler_with(Registries::new());
            assert!(matches!(
                compiler.compile(Vec::<template_compiler::NodeRef>::new()),
                Err(CompileError::EmptySelection)
            ));
        }

        #[test]
        fn should_require_a_scope_at_link_time() {
            let (compiler, _) = compiler_with(Registries::new());
            let linker = compiler.compile("<div></div>").unwrap();
            assert!(matches!(linker.link(None), Err(CompileError::MissingScope)));
        }

        #[test]
        fn should_compile_a_detached_element_target() {
            let dom = Dom::new();
            let element = dom.create_element("div");
            element.set_attr("id", "root");
            let (compiler, _) = compiler_with(Registries::new());
            let linker = compiler.compile(&element).unwrap();
            let bound = linker.link(Some(&Scope::new())).unwrap();
            assert_eq!(bound, element);
        }

        #[test]
        fn should_compile_a_text_only_target() {
            let (compiler, _) = compiler_with(Registries::new());
            let linker = compiler.compile("just text").unwrap();
            let bound = linker.link(Some(&Scope::new())).unwrap();
            assert_eq!(bound.outer_html(), "just text");
            assert!(linker.template().is_empty());
        }
    }

    mod widgets {
        use super::*;

        #[test]
        fn should_let_a_widget_own_its_node() {
            let compiled = log();
            let mut registries = Registries::new();
            {
                let compiled = compiled.clone();
                registries.add_widget(
                    "widget",
                    BehaviorFactory::direct(move |_api, _locals| {
                        push(&compiled, "widget");
                        Ok(None)
                    }),
                );
            }
            {
                let compiled = compiled.clone();
                registries.add_directive(
                    "dir",
                    BehaviorFactory::direct(move |_api, _locals| {
                        push(&compiled, "dir");
                        Ok(None)
                    }),
                );
            }
            {
                let compiled = compiled.clone();
                registries.add_markup(move |_api, _text, _node, _parent| {
                    push(&compiled, "markup");
                    Ok(())
                });
            }
            let (compiler, _) = compiler_with(registries);
            let linker = compiler
                .compile("<widget dir=\"x\"><span dir=\"y\">t</span></widget>")
                .unwrap();
            // neither the node's own directives nor anything below it was
            // looked at
            assert_eq!(entries(&compiled), vec!["widget"]);
            assert!(linker.template().is_empty());
        }

        #[test]
        fn should_prefer_the_alphabetically_first_attribute_widget() {
            let compiled = log();
            let mut registries = Registries::new();
            for name in ["alpha", "beta"] {
                let compiled = compiled.clone();
                registries.add_attr_widget(
                    name,
                    BehaviorFactory::direct(move |_api, locals| {
                        push(
                            &compiled,
                            format!("{name}={}", locals.value.clone().unwrap_or_default()),
                        );
                        Ok(None)
                    }),
                );
            }
            let (compiler, _) = compiler_with(registries);
            // attribute order in the markup must not matter
            let linker = compiler
                .compile("<div beta=\"b\" alpha=\"a\"></div>")
                .unwrap();
            assert_eq!(entries(&compiled), vec!["alpha=a"]);
            assert!(linker.element().has_class("tpl-attr-widget"));
        }

        #[test]
        fn should_annotate_namespaced_element_widgets() {
            let mut registries = Registries::new();
            registries.add_widget("my:thing", BehaviorFactory::direct(|_api, _locals| Ok(None)));
            registries.add_widget("plain", BehaviorFactory::direct(|_api, _locals| Ok(None)));
            let (compiler, _) = compiler_with(registries);

            let namespaced = compiler.compile("<my:thing></my:thing>").unwrap();
            assert!(namespaced.element().has_class("my-thing"));
            assert!(namespaced.element().has_class("tpl-widget"));

            let plain = compiler.compile("<plain></plain>").unwrap();
            assert!(!plain.element().has_class("tpl-widget"));
        }

        #[test]
        fn should_keep_compiling_at_the_position_of_a_replaced_node() {
            let linked = log();
            let mut registries = Registries::new();
            registries.add_widget(
                "swap",
                BehaviorFactory::direct(|api, locals| {
                    let element = locals.element.clone().unwrap();
                    let dom = element.dom().clone();
                    let replacement = dom.create_element("section");
                    let child = dom.create_element("span");
                    child.set_attr("live", "");
                    replacement.append_child(&child);
                    element.replace_with(&replacement);
                    api.descend(Some(true));
                    Ok(None)
                }),
            );
            logging_directive(&mut registries, "live", &linked);
            let (compiler, handler) = compiler_with(registries);
            let linker = compiler.compile("<div><swap></swap></div>").unwrap();
            let bound = linker.link(Some(&Scope::new())).unwrap();
            assert_eq!(entries(&linked), vec!["link:"]);
            assert!(bound.outer_html().contains("<section>"));
            assert!(handler.is_empty());
        }
    }

    mod markup {
        use super::*;

        #[test]
        fn should_invoke_the_matcher_once_with_text_and_parent() {
            let calls = Rc::new(RefCell::new(Vec::new()));
            let mut registries = Registries::new();
            {
                let calls = calls.clone();
                registries.add_markup(move |_api, text, node, parent| {
                    assert!(node.is_text());
                    calls.borrow_mut().push((
                        text.to_string(),
                        parent.node_name(),
                        parent.attr("id").unwrap_or_default(),
                    ));
                    Ok(())
                });
            }
            let (compiler, _) = compiler_with(registries);
            compiler
                .compile("<div><span id=\"x\">{{}}</span></div>")
                .unwrap();
            let calls = calls.borrow();
            assert_eq!(calls.len(), 1);
            assert_eq!(
                calls[0],
                ("{{}}".to_string(), "span".to_string(), "x".to_string())
            );
        }

        #[test]
        fn should_run_every_registered_matcher() {
            let compiled = log();
            let mut registries = Registries::new();
            for name in ["first", "second"] {
                let compiled = compiled.clone();
                registries.add_markup(move |_api, text, _node, _parent| {
                    push(&compiled, format!("{name}:{text}"));
                    Ok(())
                });
            }
            let (compiler, _) = compiler_with(registries);
            compiler.compile("<p>hello</p>").unwrap();
            assert_eq!(entries(&compiled), vec!["first:hello", "second:hello"]);
        }

        #[test]
        fn should_survive_a_matcher_consuming_the_text_node() {
            let compiled = log();
            let mut registries = Registries::new();
            {
                let compiled = compiled.clone();
                registries.add_markup(move |_api, _text, node, _parent| {
                    push(&compiled, "first");
                    node.remove();
                    Ok(())
                });
            }
            {
                let compiled = compiled.clone();
                registries.add_markup(move |_api, _text, _node, _parent| {
                    push(&compiled, "second");
                    Ok(())
                });
            }
            let (compiler, _) = compiler_with(registries);
            // the only text node is removed by the first matcher; the second
            // must not be called with a stale position
            compiler.compile("<p>gone</p>").unwrap();
            assert_eq!(entries(&compiled), vec!["first"]);
        }

        #[test]
        fn should_see_rewritten_text_through_later_matchers() {
            let compiled = log();
            let mut registries = Registries::new();
            registries.add_markup(|_api, _text, node, _parent| {
                node.set_text("rewritten");
                Ok(())
            });
            {
                let compiled = compiled.clone();
                registries.add_markup(move |_api, text, _node, _parent| {
                    push(&compiled, text);
                    Ok(())
                });
            }
            let (compiler, _) = compiler_with(registries);
            compiler.compile("<p>original</p>").unwrap();
            assert_eq!(entries(&compiled), vec!["rewritten"]);
        }
    }

    mod directives {
        use super::*;

        #[test]
        fn should_match_by_lowercased_attribute_name() {
            let linked = log();
            let mut registries = Registries::new();
            logging_directive(&mut registries, "my:bind", &linked);
            let (compiler, _) = compiler_with(registries);
            let dom = Dom::new();
            let element = dom.create_element("div");
            element.set_attr("My:Bind", "greeting");
            let linker = compiler.compile(&element).unwrap();
            linker.link(Some(&Scope::new())).unwrap();
            assert_eq!(entries(&linked), vec!["link:greeting"]);
            assert!(element.has_class("tpl-directive"));
        }

        #[test]
        fn should_run_attr_markup_for_every_attribute_and_matcher() {
            let compiled = log();
            let mut registries = Registries::new();
            for name in ["m1", "m2"] {
                let compiled = compiled.clone();
                registries.add_attr_markup(move |_api, value, attr_name, _element| {
                    push(&compiled, format!("{name}:{attr_name}={value}"));
                    Ok(())
                });
            }
            let (compiler, _) = compiler_with(registries);
            compiler.compile("<div b=\"2\" a=\"1\"></div>").unwrap();
            // sorted attribute order outside, registration order inside
            assert_eq!(
                entries(&compiled),
                vec!["m1:a=1", "m2:a=1", "m1:b=2", "m2:b=2"]
            );
        }

        #[test]
        fn should_order_callbacks_widget_then_directives_then_children() {
            let linked = log();
            let mut registries = Registries::new();
            {
                let linked = linked.clone();
                registries.add_widget(
                    "w:box",
                    BehaviorFactory::direct(move |api, _locals| {
                        // the widget opts back in to directives and children
                        api.directives(Some(true));
                        api.descend(Some(true));
                        let linked = linked.clone();
                        Ok(Some(LinkFn::direct(move |_scope, _element| {
                            push(&linked, "link:widget");
                            Ok(())
                        })))
                    }),
                );
            }
            for name in ["a", "b"] {
                logging_directive(&mut registries, name, &linked);
            }
            let (compiler, _) = compiler_with(registries);
            let linker = compiler
                .compile("<w:box b=\"2\" a=\"1\"><u a=\"3\"></u><u b=\"4\"></u></w:box>")
                .unwrap();
            linker.link(Some(&Scope::new())).unwrap();
            assert_eq!(
                entries(&linked),
                vec!["link:widget", "link:1", "link:2", "link:3", "link:4"]
            );
        }

        #[test]
        fn should_decode_hyperlink_attribute_values() {
            let seen = log();
            let mut registries = Registries::new();
            {
                let seen = seen.clone();
                registries.add_directive(
                    "href",
                    BehaviorFactory::direct(move |_api, locals| {
                        push(&seen, locals.value.clone().unwrap_or_default());
                        Ok(None)
                    }),
                );
            }
            let (compiler, _) = compiler_with(registries);
            let linker = compiler
                .compile("<a href=\"/path%20to/%7Bid%7D\"></a>")
                .unwrap();
            assert_eq!(entries(&seen), vec!["/path to/{id}"]);
            // the live attribute itself stays encoded
            assert_eq!(
                linker.element().attr("href").unwrap(),
                "/path%20to/%7Bid%7D"
            );
        }

        #[test]
        fn should_honor_configuration_overrides() {
            let seen = log();
            let mut registries = Registries::new();
            {
                let seen = seen.clone();
                registries.add_directive(
                    "href",
                    BehaviorFactory::direct(move |_api, locals| {
                        push(&seen, locals.value.clone().unwrap_or_default());
                        Ok(None)
                    }),
                );
            }
            let handler = Rc::new(CollectingExceptionHandler::new());
            let compiler =
                Compiler::with_collaborators(registries, Rc::new(LocalInjector), handler)
                    .with_config(CompilerConfig {
                        annotation_prefix: "ng".to_string(),
                        decode_hyperlinks: false,
                    });
            let linker = compiler.compile("<a href=\"x%20y\"></a>").unwrap();
            assert_eq!(entries(&seen), vec!["x%20y"]);
            assert!(linker.element().has_class("ng-directive"));
            assert!(!linker.element().has_class("tpl-directive"));
        }

        #[test]
        fn should_stop_descending_when_asked() {
            let compiled = log();
            let mut registries = Registries::new();
            registries.add_directive(
                "stop",
                BehaviorFactory::direct(|api, _locals| {
                    api.descend(Some(false));
                    Ok(None)
                }),
            );
            {
                let compiled = compiled.clone();
                registries.add_directive(
                    "live",
                    BehaviorFactory::direct(move |_api, _locals| {
                        push(&compiled, "live");
                        Ok(None)
                    }),
                );
            }
            let (compiler, _) = compiler_with(registries);
            let linker = compiler
                .compile("<div stop=\"\"><b live=\"\"></b></div>")
                .unwrap();
            assert!(entries(&compiled).is_empty());
            assert!(linker.template().is_empty());
        }
    }

    mod scopes {
        use super::*;

        #[test]
        fn should_create_a_child_scope_when_requested() {
            let mut registries = Registries::new();
            registries.add_directive(
                "own-scope",
                BehaviorFactory::direct(|api, _locals| {
                    api.scope(Some(NewScope::Child));
                    Ok(Some(LinkFn::direct(|_scope, _element| Ok(()))))
                }),
            );
            let (compiler, _) = compiler_with(registries);
            let linker = compiler.compile("<div own-scope=\"\"></div>").unwrap();
            let scope = Scope::new();
            let bound = linker.link(Some(&scope)).unwrap();
            let attached = bound
                .data(SCOPE_DATA_KEY)
                .and_then(|data| data.as_scope().cloned())
                .expect("element must carry its scope");
            assert!(!attached.same(&scope));
            assert_eq!(attached.parent().unwrap(), scope);
        }

        #[test]
        fn should_seed_a_child_scope_from_the_producer() {
            let seen = log();
            let mut registries = Registries::new();
            {
                let seen = seen.clone();
                registries.add_directive(
                    "with-user",
                    BehaviorFactory::direct(move |api, _locals| {
                        api.scope(Some(NewScope::ChildFrom(Rc::new(|scope: &Scope| {
                            json!({"user": scope.get("default").unwrap_or(json!("anon"))})
                        }))));
                        let seen = seen.clone();
                        Ok(Some(LinkFn::direct(move |scope, _element| {
                            push(&seen, scope.get("user").unwrap().as_str().unwrap());
                            Ok(())
                        })))
                    }),
                );
            }
            let (compiler, _) = compiler_with(registries);
            let linker = compiler.compile("<div with-user=\"\"></div>").unwrap();
            let scope = Scope::new();
            scope.set("default", json!("ada"));
            linker.link(Some(&scope)).unwrap();
            assert_eq!(entries(&seen), vec!["ada"]);
        }

        #[test]
        fn should_retain_the_first_new_scope_decision() {
            let seen = log();
            let mut registries = Registries::new();
            for (attr, tag) in [("a", "first"), ("b", "second")] {
                let seen = seen.clone();
                registries.add_directive(
                    attr,
                    BehaviorFactory::direct(move |api, _locals| {
                        api.scope(Some(NewScope::ChildFrom(Rc::new(move |_scope: &Scope| {
                            json!({"tag": tag})
                        }))));
                        // the getter must reflect the decision already made
                        assert!(!api.scope(None).is_keep());
                        let seen = seen.clone();
                        Ok(Some(LinkFn::direct(move |scope, _element| {
                            push(&seen, scope.get("tag").unwrap().as_str().unwrap());
                            Ok(())
                        })))
                    }),
                );
            }
            let (compiler, _) = compiler_with(registries);
            let linker = compiler.compile("<div a=\"\" b=\"\"></div>").unwrap();
            assert!(matches!(linker.template().new_scope(), NewScope::ChildFrom(_)));
            linker.link(Some(&Scope::new())).unwrap();
            // both callbacks saw the scope seeded by the first decision
            assert_eq!(entries(&seen), vec!["first", "first"]);
        }

        #[test]
        fn should_give_the_scope_an_element_back_reference() {
            let (compiler, _) = compiler_with(Registries::new());
            let linker = compiler.compile("<div></div>").unwrap();
            let scope = Scope::new();
            let bound = linker.link(Some(&scope)).unwrap();
            assert_eq!(scope.element().unwrap(), bound);
        }
    }

    mod linking {
        use super::*;

        #[test]
        fn should_report_callback_failures_and_continue() {
            let linked = log();
            let mut registries = Registries::new();
            logging_directive(&mut registries, "a", &linked);
            registries.add_directive(
                "b",
                BehaviorFactory::direct(|_api, _locals| {
                    Ok(Some(LinkFn::direct(|_scope, _element| {
                        Err(anyhow::anyhow!("boom"))
                    })))
                }),
            );
            logging_directive(&mut registries, "c", &linked);
            logging_directive(&mut registries, "child", &linked);
            let (compiler, handler) = compiler_with(registries);
            let linker = compiler
                .compile("<div a=\"1\" b=\"2\" c=\"3\"><p child=\"4\"></p></div>")
                .unwrap();
            linker.link(Some(&Scope::new())).unwrap();
            assert_eq!(entries(&linked), vec!["link:1", "link:3", "link:4"]);
            assert_eq!(handler.len(), 1);
            assert!(handler.messages()[0].contains("boom"));
        }

        #[test]
        fn should_skip_children_removed_before_linking() {
            let linked = log();
            let mut registries = Registries::new();
            registries.add_directive(
                "zap-last",
                BehaviorFactory::direct(|_api, _locals| {
                    Ok(Some(LinkFn::direct(|_scope, element| {
                        if let Some(last) = element.child_node(1) {
                            last.remove();
                        }
                        Ok(())
                    })))
                }),
            );
            logging_directive(&mut registries, "keep", &linked);
            logging_directive(&mut registries, "gone", &linked);
            let (compiler, handler) = compiler_with(registries);
            let linker = compiler
                .compile("<div zap-last=\"\"><b keep=\"1\"></b><i gone=\"2\"></i></div>")
                .unwrap();
            linker.link(Some(&Scope::new())).unwrap();
            assert_eq!(entries(&linked), vec!["link:1"]);
            assert!(handler.is_empty());
        }

        #[test]
        fn should_drop_empty_subtrees_from_the_compiled_form() {
            let mut registries = Registries::new();
            registries.add_directive(
                "live",
                BehaviorFactory::direct(|_api, _locals| {
                    Ok(Some(LinkFn::direct(|_scope, _element| Ok(()))))
                }),
            );
            let (compiler, _) = compiler_with(registries);
            let linker = compiler
                .compile("<div><section><p></p></section><span live=\"\"></span></div>")
                .unwrap();
            let template = linker.template();
            // only the matching child is recorded, at its original position
            assert_eq!(template.paths(), &[1]);
            assert_eq!(template.children().len(), 1);
            assert_eq!(template.link_fn_count(), 0);
        }
    }

    mod cloning {
        use super::*;

        #[test]
        fn should_link_independent_clones() {
            let mut registries = Registries::new();
            registries.add_directive(
                "bind",
                BehaviorFactory::direct(|_api, locals| {
                    let key = locals.value.clone().unwrap_or_default();
                    Ok(Some(LinkFn::direct(move |scope, element| {
                        if let Some(value) = scope.get(&key) {
                            element.set_text(value.as_str().unwrap_or_default());
                        }
                        Ok(())
                    })))
                }),
            );
            let (compiler, _) = compiler_with(registries);
            let linker = compiler.compile("<p bind=\"msg\"></p>").unwrap();

            let first_scope = Scope::new();
            first_scope.set("msg", json!("first"));
            let second_scope = Scope::new();
            second_scope.set("msg", json!("second"));

            let order = log();
            let first = {
                let order = order.clone();
                linker
                    .link_clone(Some(&first_scope), move |_clone, _scope| {
                        push(&order, "connect");
                    })
                    .unwrap()
            };
            let second = linker.link_clone(Some(&second_scope), |_, _| {}).unwrap();

            assert_eq!(first.text(), "first");
            assert_eq!(second.text(), "second");
            assert_ne!(first, second);
            // the clone was handed over before its callbacks ran
            assert_eq!(entries(&order), vec!["connect"]);

            // the compiled original is bound to neither instance
            assert_eq!(linker.element().text(), "");
            assert!(linker.element().data(SCOPE_DATA_KEY).is_none());

            // instances share no state
            first.set_attr("marker", "1");
            assert!(second.attr("marker").is_none());
        }

        #[test]
        fn should_let_a_widget_compile_and_stamp_nested_content() {
            let mut registries = Registries::new();
            registries.add_directive(
                "bind",
                BehaviorFactory::direct(|_api, locals| {
                    let key = locals.value.clone().unwrap_or_default();
                    Ok(Some(LinkFn::direct(move |scope, element| {
                        if let Some(value) = scope.get(&key) {
                            element.set_text(&value.to_string());
                        }
                        Ok(())
                    })))
                }),
            );
            registries.add_widget(
                "repeat",
                BehaviorFactory::direct(|api, locals| {
                    let element = locals.element.clone().unwrap();
                    let content = element.child_node(0).expect("repeater needs content");
                    content.remove();
                    let stamp = Rc::new(api.compile(&content)?);
                    Ok(Some(LinkFn::direct(move |scope, element| {
                        for i in 0..3 {
                            let row_scope = scope.new_child();
                            row_scope.set("i", json!(i));
                            let target = element.clone();
                            stamp.link_clone(Some(&row_scope), move |clone, _scope| {
                                target.append_child(clone);
                            })?;
                        }
                        Ok(())
                    })))
                }),
            );
            let (compiler, handler) = compiler_with(registries);
            let linker = compiler
                .compile("<repeat><span bind=\"i\"></span></repeat>")
                .unwrap();
            let bound = linker.link(Some(&Scope::new())).unwrap();
            assert_eq!(bound.child_count(), 3);
            assert_eq!(bound.text(), "012");
            assert!(handler.is_empty());
        }
    }

    mod injection {
        use super::*;

        #[test]
        fn should_resolve_declared_injectables_from_the_locals() {
            let mut registries = Registries::new();
            registries.add_directive(
                "greet",
                BehaviorFactory::injected(&["$value", "$element"], |_api, args| {
                    let value = args[0].as_value().unwrap().to_string();
                    assert!(args[1].as_element().is_some());
                    Ok(Some(LinkFn::injected(&["$element"], move |_scope, args| {
                        let element = args[0].as_element().unwrap();
                        element.set_attr("greeting", &value);
                        Ok(())
                    })))
                }),
            );
            let (compiler, handler) = compiler_with(registries);
            let linker = compiler.compile("<div greet=\"hello\"></div>").unwrap();
            let bound = linker.link(Some(&Scope::new())).unwrap();
            assert_eq!(bound.attr("greeting").unwrap(), "hello");
            assert!(handler.is_empty());
        }

        #[test]
        fn should_fail_compilation_on_unknown_injectables() {
            let mut registries = Registries::new();
            registries.add_directive(
                "needy",
                BehaviorFactory::injected(&["$nope"], |_api, _args| Ok(None)),
            );
            let (compiler, _) = compiler_with(registries);
            let err = compiler.compile("<div needy=\"\"></div>").err().unwrap();
            assert!(matches!(err, CompileError::Behavior(_)));
            assert!(err.to_string().contains("unknown injectable '$nope'"));
        }
    }
}
