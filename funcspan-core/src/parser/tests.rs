//! Tests for the SWC parser adapter

#[cfg(test)]
mod parser_tests {
    use crate::error::Error;
    use crate::language::SourceKind;
    use crate::parser;
    use std::path::Path;
    use swc_common::{sync::Lrc, SourceMap};
    use swc_ecma_ast::Program;

    fn parse_test(src: &str, filename: &str) -> Result<parser::ParsedSource, Error> {
        let cm: Lrc<SourceMap> = Default::default();
        parser::parse_source(src, &cm, filename, SourceKind::from_path(Path::new(filename)))
    }

    #[test]
    fn test_parse_simple_function_javascript() {
        let src = "function foo() { return 42; }";
        let result = parse_test(src, "test.js");
        assert!(result.is_ok(), "Should parse simple JavaScript function");
    }

    #[test]
    fn test_parse_typescript_types() {
        let src = "function foo(x: number): number { return x * 2; }";
        let result = parse_test(src, "test.ts");
        assert!(result.is_ok(), "Should parse TypeScript types");
    }

    #[test]
    fn test_parse_rejects_typescript_in_javascript() {
        let src = "function foo(x: number): number { return x * 2; }";
        let result = parse_test(src, "test.js");
        assert!(
            matches!(result, Err(Error::Parse { .. })),
            "Type annotations are not JavaScript"
        );
    }

    #[test]
    fn test_parse_rejects_jsx_in_plain_javascript() {
        let src = "function foo() { return <div>hello</div>; }";
        let result = parse_test(src, "test.js");
        // JSX needs a .jsx extension
        assert!(
            result.is_err(),
            "JSX syntax should cause parse error in .js files (use .jsx instead)"
        );
    }

    #[test]
    fn test_parse_accepts_jsx_in_jsx_and_tsx_files() {
        let src = "function foo() { return <div>hello</div>; }";
        assert!(parse_test(src, "test.jsx").is_ok());
        assert!(parse_test(src, "test.tsx").is_ok());
    }

    #[test]
    fn test_parse_error_names_file() {
        let result = parse_test("function foo( {", "broken.js");
        match result {
            Err(Error::Parse { path, message }) => {
                assert_eq!(path, Path::new("broken.js"));
                assert!(!message.is_empty());
            }
            Err(other) => panic!("expected a parse error, got {other}"),
            Ok(_) => panic!("expected a parse error"),
        }
    }

    #[test]
    fn test_parse_script_and_module() {
        let script = parse_test("var x = 1;", "test.js").unwrap();
        assert!(matches!(script.program, Program::Script(_)));

        let module = parse_test("export const x = 1;", "test.js").unwrap();
        assert!(matches!(module.program, Program::Module(_)));
    }

    #[test]
    fn test_parse_sloppy_mode_script() {
        // `with` is only legal outside modules
        let src = "with (obj) { f = function () {}; }";
        assert!(parse_test(src, "test.js").is_ok());
    }

    #[test]
    fn test_parse_declaration_file() {
        let src = "declare function foo(x: number): void;";
        assert!(parse_test(src, "types.d.ts").is_ok());
    }
}
