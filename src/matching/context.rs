//! Context frames.
//!
//! A [Context] is an immutable linked chain of the productions being expanded, innermost
//! first. Expanding a non-terminal pushes a frame that borrows its parent; the frame lives
//! on the call stack for exactly as long as the expansion, so nothing is ever mutated or
//! popped by hand.

use crate::definition::Grammar;

#[derive(Debug, Clone, Copy)]
pub struct Context<'c> {
    production: Option<&'c str>,
    /// The argument of a parametric production, e.g. the test grammar of a boolean
    /// expression.
    parameter: Option<&'c Grammar>,
    parent: Option<&'c Context<'c>>,
    depth: u32,
}

impl<'c> Context<'c> {
    /// A root frame, optionally naming the production a grammar is matched as.
    pub fn root(production: Option<&'c str>) -> Self {
        Self {
            production,
            parameter: None,
            parent: None,
            depth: 0,
        }
    }

    /// A child frame for the expansion of `production`.
    pub fn push<'a>(&'a self, production: &'a str, parameter: Option<&'a Grammar>) -> Context<'a> {
        Context {
            production: Some(production),
            parameter,
            parent: Some(self),
            depth: self.depth + 1,
        }
    }

    pub fn production(&self) -> Option<&'c str> {
        self.production
    }

    /// Production names from this frame outwards.
    pub fn productions(&self) -> impl Iterator<Item = &'c str> + '_ {
        std::iter::successors(Some(self), |frame| frame.parent.map(|parent| parent as &Context<'c>))
            .filter_map(|frame| frame.production)
    }

    /// The nearest parameter, together with the frame it must be matched in: the parent of
    /// the frame that received it. A parameter that itself refers to `<test>` then resolves
    /// to the parameter one level further out.
    pub fn parameter_scope(&self) -> Option<(&'c Grammar, &'c Context<'c>)> {
        let mut frame: &Context<'c> = self;
        loop {
            if let (Some(parameter), Some(parent)) = (frame.parameter, frame.parent) {
                return Some((parameter, parent));
            }
            frame = frame.parent?;
        }
    }

    /// Number of frames above the root.
    pub fn depth(&self) -> u32 {
        self.depth
    }
}
