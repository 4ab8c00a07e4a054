//! Context behaviour suite
//!
//! Exercises setup inheritance, composed names, context macros, pending
//! declarations and static contexts against the engine itself.

use std::cell::Cell;
use std::rc::Rc;

use crate::assertion::{check, check_eq, check_match, flunk};
use crate::context::{ContextBuilder, ContextNode};
use crate::error::{BuildError, BuildResult};

/// Fields shared by every action of the context suite
#[derive(Debug, Default)]
pub struct ContextTestState {
    pub blah: String,
    pub context_macro: Option<&'static str>,
    pub hello: Option<fn() -> &'static str>,
    pub magical_variable: String,
    pub instance_var: u32,
    pub variable_context_var: u32,
}

type Builder<'a> = ContextBuilder<'a, ContextTestState>;

/// Wraps `block` in a subcontext with its own setup
fn context_macro<F>(ctx: &mut Builder<'_>, block: F) -> BuildResult
where
    F: FnOnce(&mut Builder<'_>) -> BuildResult,
{
    ctx.context("with a subcontext made by a macro", |ctx| {
        ctx.setup(|st| {
            st.context_macro = Some("foo");
            Ok(())
        });
        ctx.merge_block(block)?;
        Ok(())
    })?;
    Ok(())
}

/// Build the context behaviour suite
pub fn context_suite() -> Result<ContextNode<ContextTestState>, BuildError> {
    ContextNode::build("", |ctx| {
        setup_inheritance(ctx)?;
        isolation(ctx)?;
        multiple_setups(ctx)?;
        pending(ctx)?;
        static_contexts(ctx)?;

        ctx.context("context", |ctx| {
            ctx.context("with nested subcontexts", |ctx| {
                ctx.should_eventually("only print this statement once for a should_eventually");
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(())
    })
}

fn setup_inheritance(ctx: &mut Builder<'_>) -> BuildResult {
    ctx.context("context with setup block", |ctx| {
        ctx.setup(|st| {
            st.blah = "blah".to_string();
            Ok(())
        });

        ctx.should("run the setup block", |st| check_eq("blah", st.blah.as_str()));
        ctx.should("have name set right", |st| {
            check_match("^test: context with setup block", st.test_name())
        });

        ctx.context("and a subcontext", |ctx| {
            ctx.setup(|st| {
                st.blah = format!("{} twice", st.blah);
                Ok(())
            });

            ctx.should("be named correctly", |st| {
                check_match(
                    "^test: context with setup block and a subcontext should be named correctly",
                    st.test_name(),
                )
            });
            ctx.should("run the setup blocks in order", |st| {
                check_eq("blah twice", st.blah.as_str())
            });
            Ok(())
        })?;

        context_macro(ctx, |ctx| {
            ctx.should("have name set right", |st| {
                check_match(
                    "^test: context with setup block with a subcontext made by a macro should have name set right",
                    st.test_name(),
                )
            });
            ctx.should("run the setup block of that context macro", |st| {
                check_eq(Some("foo"), st.context_macro)
            });
            ctx.should("run the setup block of the main context", |st| {
                check_eq("blah", st.blah.as_str())
            });
            Ok(())
        })
    })?;
    Ok(())
}

fn isolation(ctx: &mut Builder<'_>) -> BuildResult {
    ctx.context("another context with setup block", |ctx| {
        ctx.setup(|st| {
            st.blah = "foo".to_string();
            Ok(())
        });

        ctx.should("have blah == 'foo'", |st| check_eq("foo", st.blah.as_str()));
        ctx.should("have name set right", |st| {
            check_match("^test: another context with setup block", st.test_name())
        });
        Ok(())
    })?;

    ctx.context("context with helper definition", |ctx| {
        ctx.setup(|st| {
            fn hello() -> &'static str {
                "hi"
            }
            st.hello = Some(hello);
            Ok(())
        });

        ctx.should("be able to call that helper", |st| {
            let hello = st.hello.map(|hello| hello());
            check_eq(Some("hi"), hello)
        });
        ctx.should("have name set right", |st| {
            check_match("^test: context with helper definition", st.test_name())
        });
        Ok(())
    })?;

    ctx.context("another context", |ctx| {
        ctx.should("not define blah", |st| {
            check(st.blah.is_empty(), format!("blah leaked: {:?}", st.blah))
        });
        Ok(())
    })?;
    Ok(())
}

fn multiple_setups(ctx: &mut Builder<'_>) -> BuildResult {
    let cleanup_count = Rc::new(Cell::new(0));

    ctx.context("context with multiple setups and/or teardowns", |ctx| {
        for _ in 0..2 {
            let up = cleanup_count.clone();
            let down = cleanup_count.clone();
            ctx.setup(move |_| {
                up.set(up.get() + 1);
                Ok(())
            });
            ctx.teardown(move |_| {
                down.set(down.get() - 1);
                Ok(())
            });
        }

        for i in 1..=2 {
            let count = cleanup_count.clone();
            ctx.should(
                format!("call all setups and all teardowns (check #{i})"),
                move |_| check_eq(2, count.get()),
            );
        }

        ctx.context("subcontexts", |ctx| {
            for _ in 0..2 {
                let up = cleanup_count.clone();
                let down = cleanup_count.clone();
                ctx.setup(move |_| {
                    up.set(up.get() + 1);
                    Ok(())
                });
                ctx.teardown(move |_| {
                    down.set(down.get() - 1);
                    Ok(())
                });
            }

            for i in 1..=2 {
                let count = cleanup_count.clone();
                ctx.should(
                    format!(
                        "also call all setups and all teardowns in parent and subcontext (check #{i})"
                    ),
                    move |_| check_eq(4, count.get()),
                );
            }
            Ok(())
        })?;
        Ok(())
    })?;
    Ok(())
}

fn pending(ctx: &mut Builder<'_>) -> BuildResult {
    ctx.should_eventually_with("pass, since it's unimplemented", |_| {
        Err(flunk("what?"))
    });
    ctx.should_eventually("not require a block when using should_eventually");
    ctx.should_stub("pass without a block, as that causes it to piggyback to should_eventually");

    ctx.context("context for testing should piggybacking", |ctx| {
        ctx.should_stub("call should_eventually as we are not passing a block");
        Ok(())
    })?;
    Ok(())
}

fn static_contexts(ctx: &mut Builder<'_>) -> BuildResult {
    ctx.context("context with basic setup", |ctx| {
        ctx.setup(|st| {
            st.magical_variable.clear();
            Ok(())
        });

        ctx.static_context(
            "static context to stash a copy the parent context's state",
            |ctx| {
                for (index, n) in ["first", "second", "third"].into_iter().enumerate() {
                    ctx.should(
                        format!("the {n} test should have {index} chars in it"),
                        move |st| {
                            check_eq(".".repeat(index), st.magical_variable.clone())?;
                            st.magical_variable.push('.');
                            Ok(())
                        },
                    );
                }
                Ok(())
            },
        )?;

        for n in ["first", "second", "third"] {
            ctx.should(format!("the {n} test should be a blank string"), |st| {
                check_eq("", st.magical_variable.as_str())?;
                st.magical_variable.push('.');
                Ok(())
            });
        }
        Ok(())
    })?;

    ctx.context("a static context", |ctx| {
        ctx.should(
            "not allow us to setup a should(.., before) hook, as that would be silly",
            |_| {
                let built = ContextNode::<ContextTestState>::build("", |ctx| {
                    ctx.static_context("foo", |ctx| {
                        ctx.should_with_before("foo", |_| Ok(()), |_| Ok(()))?;
                        Ok(())
                    })?;
                    Ok(())
                });
                check(
                    matches!(built, Err(BuildError::InvalidOperation { .. })),
                    "expected the before hook to be rejected",
                )
            },
        );
        Ok(())
    })?;

    let static_setup_var = Rc::new(Cell::new(0));
    ctx.static_context("static context with setup and teardown only run once", |ctx| {
        let counter = static_setup_var.clone();
        ctx.setup(move |st| {
            counter.set(counter.get() + 1);
            st.instance_var += 1;
            Ok(())
        });

        for n in ["first", "second"] {
            let counter = static_setup_var.clone();
            ctx.should(
                format!("have only run the setup once after the {n} should"),
                move |_| check_eq(1, counter.get()),
            );
        }

        for n in ["first", "second"] {
            ctx.should(
                format!("have instance variables available in the {n} should"),
                |st| check_eq(1u32, st.instance_var),
            );
        }

        ctx.context("but this dynamic context should be run more than once", |ctx| {
            ctx.setup(|st| {
                st.variable_context_var = 0;
                Ok(())
            });

            ctx.should("have access to the static context variables", |st| {
                check_eq(1u32, st.instance_var)
            });

            for n in ["first", "second"] {
                ctx.should(
                    format!("have its own variables available and correctly set on the {n} time"),
                    |st| {
                        st.variable_context_var += 1;
                        check_eq(1u32, st.variable_context_var)
                    },
                );
            }
            Ok(())
        })?;
        Ok(())
    })?;
    Ok(())
}
