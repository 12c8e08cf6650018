use crate::sequence::Seq;
use std::sync::Arc;

/// A Pipe represents a reusable pipeline fragment from one item type to another.
/// It's a function from Seq[I] to Seq[O]; applying it builds stages but reads nothing.
pub struct Pipe<'a, I, O> {
    f: Arc<dyn Fn(Seq<'a, I>) -> Seq<'a, O> + 'a>,
}

impl<'a, I, O> Clone for Pipe<'a, I, O> {
    fn clone(&self) -> Self {
        Pipe {
            f: Arc::clone(&self.f),
        }
    }
}

impl<'a, I, O> Pipe<'a, I, O> {
    /// Create a new pipe from a function
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Seq<'a, I>) -> Seq<'a, O> + 'a,
    {
        Pipe { f: Arc::new(f) }
    }

    /// Apply this pipe to a sequence
    pub fn apply(&self, input: Seq<'a, I>) -> Seq<'a, O> {
        (self.f)(input)
    }
}

/// Create a pipe that applies the given function to each element
pub fn map<'a, I, O, F>(f: F) -> Pipe<'a, I, O>
where
    F: Fn(I) -> O + Clone + 'a,
    I: 'a,
    O: 'a,
{
    Pipe::new(move |input: Seq<'a, I>| input.map(f.clone()))
}

/// Create a pipe that filters elements based on the predicate
pub fn filter<'a, I, F>(predicate: F) -> Pipe<'a, I, I>
where
    F: Fn(&I) -> bool + Clone + 'a,
    I: 'a,
{
    Pipe::new(move |input: Seq<'a, I>| input.filter(predicate.clone()))
}

/// Compose two pipes together
pub fn compose<'a, I, M, O>(p1: Pipe<'a, I, M>, p2: Pipe<'a, M, O>) -> Pipe<'a, I, O>
where
    I: 'a,
    M: 'a,
    O: 'a,
{
    Pipe::new(move |input| p2.apply(p1.apply(input)))
}

/// Identity pipe that doesn't transform the sequence
pub fn identity<'a, I>() -> Pipe<'a, I, I>
where
    I: 'a,
{
    Pipe::new(|input| input)
}

/// Extension trait for pipes
pub trait PipeExt<'a, I, O> {
    /// Compose this pipe with another pipe
    fn compose<P>(self, other: Pipe<'a, O, P>) -> Pipe<'a, I, P>
    where
        P: 'a;
}

impl<'a, I, O> PipeExt<'a, I, O> for Pipe<'a, I, O>
where
    I: 'a,
    O: 'a,
{
    fn compose<P>(self, other: Pipe<'a, O, P>) -> Pipe<'a, I, P>
    where
        P: 'a,
    {
        compose(self, other)
    }
}

impl<'a, T: 'a> Seq<'a, T> {
    /// Run this sequence through a pipe
    pub fn through<O>(&self, pipe: &Pipe<'a, T, O>) -> Seq<'a, O> {
        pipe.apply(self.clone())
    }
}
