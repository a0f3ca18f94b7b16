use trampoline::{CancellationToken, GeneratedOutput, Generator, GeneratorOptions, parse_snapshot};

/// Generate from a JSON snapshot with default options.
pub fn generate(snapshot: &str) -> GeneratedOutput {
    let compilation = parse_snapshot(snapshot).expect("invalid snapshot");
    Generator::new(GeneratorOptions::default())
        .generate(&compilation, &CancellationToken::new())
        .expect("generation failed")
}

/// Generate from `snapshot`, then check source fragments and diagnostic codes.
macro_rules! test_case {
    (
        $name:ident,
        snapshot: $snapshot:expr,
        contains: [$($needle:expr),* $(,)?],
        diagnostics: [$($code:expr),* $(,)?] $(,)?
    ) => {
        #[test]
        fn $name() {
            let output = cases::generate($snapshot);
            $(
                assert!(
                    output.source.contains($needle),
                    "missing {:?} in generated source:\n{}",
                    $needle,
                    output.source
                );
            )*
            let codes: Vec<&str> = output.diagnostics.iter().map(|d| d.code).collect();
            let expected: Vec<&str> = vec![$($code),*];
            pretty_assertions::assert_eq!(codes, expected);
        }
    };
}
