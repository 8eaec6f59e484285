#[cfg(test)]
mod testkit;
