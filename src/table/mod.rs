mod attribute;
mod attributes;

pub use self::{
    attribute::{TableAttribute, TryFromTableAttr},
    attributes::TableAttributes,
};
