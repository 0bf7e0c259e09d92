use core_types::DocKey;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// `redraw` was asked to draw a tree without any root document.
    #[error("cannot draw an empty navigation tree")]
    EmptyTree,
    /// A selection named a child that its parent does not own.
    #[error("`{child}` is not a child of `{parent}`")]
    InvalidState { parent: DocKey, child: DocKey },
    /// A tab action or removal named a document that is no longer open.
    #[error("no open document with key `{0}`")]
    UnknownKey(DocKey),
}
