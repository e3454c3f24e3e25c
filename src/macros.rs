// Only ever called with string literals.
macro_rules! regex(
    ($s:expr) => (::regex::Regex::new($s).unwrap());
);
