pub(crate) mod curriculum;
pub(crate) mod slug;
