//! The `noerrors` package: formulas that fail to parse render as their
//! source text inside an `merror` node instead of failing.
//! See [`TexInput::parse_or_recover`](crate::TexInput::parse_or_recover).

use crate::core::options::ParserOptions;

use super::Configuration;

fn init(options: &mut ParserOptions) {
    options.recover_errors = true;
}

pub fn configuration() -> Configuration {
    Configuration::new("noerrors").init(init)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_enables_recovery() {
        let mut options = ParserOptions::default();
        let hook = configuration().init.unwrap();
        hook(&mut options);
        assert!(options.recover_errors);
    }
}
