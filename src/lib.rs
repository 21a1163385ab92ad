pub mod entity;
pub mod lifecycle;

#[cfg(test)]
pub mod testing;
