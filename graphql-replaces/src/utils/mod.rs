//! This module contains various tools that help the ergonomics of this crate.

mod extended_type_ext;
mod words;

pub(crate) use extended_type_ext::ExtendedTypeExt;
pub(crate) use words::replace_whole_word;
