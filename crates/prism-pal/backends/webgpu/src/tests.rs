use api::{
    buffer::BufferCreateError, descriptor_set::DescriptorSetUpdateError,
    texture::TextureCreateError,
};

use crate::ScopeError;

#[test]
fn out_of_memory_is_not_a_generic_error() {
    assert!(matches!(
        BufferCreateError::from(ScopeError::OutOfMemory),
        BufferCreateError::OutOfMemory
    ));
    assert!(matches!(
        TextureCreateError::from(ScopeError::OutOfMemory),
        TextureCreateError::OutOfMemory
    ));
    assert!(matches!(
        DescriptorSetUpdateError::from(ScopeError::OutOfMemory),
        DescriptorSetUpdateError::OutOfMemory
    ));
    assert_eq!(
        TextureCreateError::OutOfMemory.to_string(),
        "out of device memory"
    );
}

#[test]
fn validation_errors_keep_their_message() {
    let err = DescriptorSetUpdateError::from(ScopeError::Invalid("bad binding".into()));
    assert!(matches!(&err, DescriptorSetUpdateError::Other(msg) if msg == "bad binding"));

    let err = BufferCreateError::from(ScopeError::Invalid("too big".into()));
    assert!(matches!(&err, BufferCreateError::Other(msg) if msg == "too big"));
}
