//! Directive interpreter.
//!
//! Walks the token stream of a template against a [`RenderContext`]. Loop
//! directives recurse into the group/entry bodies, each iteration with its own
//! child context and therefore its own condition stack.

use super::condition::ConditionState;
use super::context::RenderContext;
use super::resolver::{PatternCache, VariableResolver};
use super::scanner::{scan, Directive, DirectiveKind, SubTemplates, Token};
use crate::entry::GroupedCollection;
use crate::error::Result;
use crate::locale::Locale;

pub struct Evaluator<'a> {
    collection: &'a GroupedCollection,
    templates: &'a SubTemplates,
    resolver: VariableResolver<'a>,
    patterns: PatternCache,
}

impl<'a> Evaluator<'a> {
    pub fn new(collection: &'a GroupedCollection, templates: &'a SubTemplates, locale: &'a Locale) -> Self {
        Self {
            collection,
            templates,
            resolver: VariableResolver::new(locale),
            patterns: PatternCache::new(),
        }
    }

    /// Render `text` in `ctx`.
    pub fn evaluate(&mut self, text: &str, ctx: &mut RenderContext<'a>) -> Result<String> {
        let mut out = String::with_capacity(text.len());

        for token in scan(text) {
            match token {
                Token::Literal(literal) => {
                    if ctx.conditions.is_active() {
                        out.push_str(literal);
                    }
                }
                Token::Directive(directive) => self.apply(directive, ctx, &mut out)?,
            }
        }

        if ctx.conditions.depth() > 0 {
            tracing::debug!("{} conditional(s) left open at end of scope", ctx.conditions.depth());
        }

        Ok(out)
    }

    fn apply(&mut self, directive: Directive<'_>, ctx: &mut RenderContext<'a>, out: &mut String) -> Result<()> {
        let Directive { kind, trailing } = directive;
        tracing::trace!(?kind, top = ?ctx.conditions.top(), "directive");

        match kind {
            DirectiveKind::Open(condition) => {
                if !ctx.conditions.is_active() {
                    ctx.conditions.push(ConditionState::Suppressed);
                    return Ok(());
                }
                let result = self.resolver.test(&condition, ctx, &mut self.patterns);
                ctx.conditions.push(ConditionState::from_bool(result));
                if result {
                    out.push_str(trailing);
                }
            }
            DirectiveKind::Else => {
                if !ctx.conditions.invert() {
                    tracing::warn!("else without an open conditional");
                }
                if ctx.conditions.is_active() {
                    out.push_str(trailing);
                }
            }
            DirectiveKind::Close => {
                if !ctx.conditions.pop() {
                    tracing::warn!("close without an open conditional");
                }
                if ctx.conditions.is_active() {
                    out.push_str(trailing);
                }
            }
            _ if !ctx.conditions.is_active() => {}
            DirectiveKind::GroupLoop => {
                out.push_str(&self.group_loop(ctx)?);
                out.push_str(trailing);
            }
            DirectiveKind::EntryLoop => {
                out.push_str(&self.entry_loop(ctx)?);
                out.push_str(trailing);
            }
            DirectiveKind::Variable(var) => {
                out.push_str(&self.resolver.resolve(&var, ctx));
                out.push_str(trailing);
            }
        }

        Ok(())
    }

    fn group_loop(&mut self, ctx: &RenderContext<'a>) -> Result<String> {
        let (collection, templates) = (self.collection, self.templates);
        let Some(body) = templates.group.as_deref() else {
            return Ok(String::new());
        };

        let mut rendered = String::new();
        for group in collection.iter() {
            let mut scope = ctx.for_group(group);
            rendered.push_str(&self.evaluate(body, &mut scope)?);
        }
        Ok(rendered)
    }

    fn entry_loop(&mut self, ctx: &RenderContext<'a>) -> Result<String> {
        let Some(group) = ctx.group() else {
            tracing::warn!("entry loop outside a group loop");
            return Ok(String::new());
        };
        let templates = self.templates;
        let Some(body) = templates.entry.as_deref() else {
            return Ok(String::new());
        };

        let mut rendered = String::new();
        for entry in &group.entries {
            let mut scope = ctx.for_entry(entry);
            rendered.push_str(&self.evaluate(body, &mut scope)?);
        }
        Ok(rendered)
    }
}
