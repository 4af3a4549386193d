pub(crate) mod shorten;
pub(crate) mod utm;
