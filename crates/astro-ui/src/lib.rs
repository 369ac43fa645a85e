pub mod state;
pub mod theme;
pub mod markup;
pub mod panels;

#[cfg(test)]
mod tests;
