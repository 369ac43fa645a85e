pub mod storage;

#[cfg(target_arch = "wasm32")]
pub mod relay_client;
#[cfg(target_arch = "wasm32")]
pub mod history_client;
#[cfg(target_arch = "wasm32")]
mod js;

#[cfg(test)]
mod tests;
