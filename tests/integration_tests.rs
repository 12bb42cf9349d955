//! Integration tests for texmml parsing

use texmml::{NodeKind, NodeRef, ParserOptions, TexClass, TexInput};

fn mathml(input: &str) -> String {
    TexInput::default()
        .parse(input)
        .unwrap_or_else(|e| panic!("'{}' failed: {}", input, e))
        .to_mathml()
}

fn error_of(session: &TexInput, input: &str) -> (String, String) {
    match session.parse(input) {
        Ok(tree) => panic!("'{}' parsed to {}", input, tree.to_mathml()),
        Err(err) => (err.id().to_string(), err.message()),
    }
}

fn with_packages(names: &[&str]) -> TexInput {
    TexInput::builder()
        .packages(names)
        .build()
        .expect("packages resolve")
}

/// First node (depth first) of the given kind
fn find<'a>(node: NodeRef<'a>, kind: NodeKind) -> Option<NodeRef<'a>> {
    if node.kind() == kind {
        return Some(node);
    }
    node.children().find_map(|child| find(child, kind))
}

// ============================================================================
// Basic parsing
// ============================================================================

mod parse_basics {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tokens() {
        let result = mathml(r"x+1");
        assert!(result.starts_with("<math"));
        assert!(result.contains(">x</mi>"));
        assert!(result.contains(">+</mo>"));
        assert!(result.contains(">1</mn>"));
    }

    #[test]
    fn test_greek_letters() {
        let letters = [(r"\alpha", "\u{3B1}"), (r"\beta", "\u{3B2}"), (r"\Omega", "\u{3A9}")];
        for (tex, expected) in letters {
            let result = mathml(tex);
            assert!(
                result.contains(&format!(">{}</mi>", expected)),
                "Expected '{}' to contain {}, got '{}'",
                tex,
                expected,
                result
            );
        }
    }

    #[test]
    fn test_fraction_and_root() {
        let result = mathml(r"\frac{a}{\sqrt{b}}");
        assert!(result.contains("<mfrac"));
        assert!(result.contains("<msqrt"));
    }

    #[test]
    fn test_scripts() {
        assert!(mathml("x^2").contains("<msup"));
        assert!(mathml("x_i").contains("<msub"));
        assert!(mathml("x_i^2").contains("<msubsup"));
    }

    #[test]
    fn test_left_right() {
        let result = mathml(r"\left( x \right)");
        assert!(result.contains(">(</mo>"));
        assert!(result.contains(">)</mo>"));
    }

    #[test]
    fn test_single_over_is_allowed() {
        assert!(mathml(r"{a \over b}").contains("<mfrac"));
    }

    #[test]
    fn test_matrix() {
        let result = mathml(r"\begin{matrix} a & b \\ c & d \end{matrix}");
        assert!(result.contains("<mtable"));
        assert_eq!(result.matches("<mtr").count(), 2);
        assert_eq!(result.matches("<mtd").count(), 4);
    }

    #[test]
    fn test_display_root() {
        let session = TexInput::with_options(ParserOptions::new().with_display(true));
        let tree = session.parse("x").unwrap();
        assert_eq!(tree.root_ref().kind(), NodeKind::Math);
        assert_eq!(tree.root_ref().attribute("display"), Some("block"));
    }

    #[test]
    fn test_determinism() {
        let session = TexInput::default();
        let input = r"\left[\frac{x^2}{\mathrm{y}}\right]_{i=1}^n \begin{pmatrix}a&b\end{pmatrix}";
        let first = session.parse(input).unwrap().to_mathml();
        for _ in 0..5 {
            assert_eq!(session.parse(input).unwrap().to_mathml(), first);
        }
        let other = TexInput::default().parse(input).unwrap().to_mathml();
        assert_eq!(other, first);
    }

    #[test]
    fn test_shared_session_across_threads() {
        let session = std::sync::Arc::new(TexInput::default());
        let expected = session.parse(r"\frac{a}{b}^2").unwrap().to_mathml();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let session = std::sync::Arc::clone(&session);
                std::thread::spawn(move || session.parse(r"\frac{a}{b}^2").unwrap().to_mathml())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn test_newcommand_expands() {
        let result = mathml(r"\newcommand{\sq}[1]{#1^2}\sq{y}");
        assert!(result.contains("<msup"));
        assert!(result.contains(">y</mi>"));
    }

    #[test]
    fn test_def_with_delimited_parameters() {
        let result = mathml(r"\def\pair(#1,#2){#1+#2}\pair(a,b)");
        assert!(result.contains(">a</mi>"));
        assert!(result.contains(">b</mi>"));
    }
}

// ============================================================================
// Errors
// ============================================================================

mod errors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_argument() {
        let (id, message) = error_of(&TexInput::default(), r"\frac{b}");
        assert_eq!(id, "MissingArgFor");
        assert_eq!(message, r"Missing argument for \frac");
    }

    #[test]
    fn test_double_exponent() {
        let (id, message) = error_of(&TexInput::default(), "x^2^3");
        assert_eq!(id, "DoubleExponent");
        assert_eq!(message, "Double exponent: use braces to clarify");
    }

    #[test]
    fn test_ambiguous_over() {
        let (id, message) = error_of(&TexInput::default(), r"1 \over 2 \over 3");
        assert_eq!(id, "AmbiguousUseOf");
        assert_eq!(message, r"Ambiguous use of \over");
    }

    #[test]
    fn test_second_infix_fraction_in_group() {
        let session = TexInput::default();
        for input in [r"{a \over b \atop c}", r"a \choose b \above 1pt c", r"x \atop y \over z"] {
            let (id, _) = error_of(&session, input);
            assert_eq!(id, "AmbiguousUseOf", "input: {}", input);
        }
    }

    #[test]
    fn test_extra_close_brace() {
        let (id, message) = error_of(&TexInput::default(), "x}");
        assert_eq!(id, "ExtraCloseMissingOpen");
        assert_eq!(message, "Extra close brace or missing open brace");
    }

    #[test]
    fn test_left_middle_without_right() {
        let (id, message) = error_of(&TexInput::default(), r"\left(\middle|");
        assert_eq!(id, "ExtraLeftMissingRight");
        assert_eq!(message, r"Extra \left or missing \right");
    }

    #[test]
    fn test_unbalanced_openers_name_the_opener() {
        let session = TexInput::default();
        let cases = [
            ("{x", "ExtraOpenMissingClose"),
            (r"\left( x", "ExtraLeftMissingRight"),
            (r"x \right)", "MissingLeftExtraRight"),
            (r"\middle| x", "ExtraMiddle"),
            (r"x \end{matrix}", "MissingBeginExtraEnd"),
        ];
        for (input, expected) in cases {
            let (id, _) = error_of(&session, input);
            assert_eq!(id, expected, "input: {}", input);
        }
    }

    #[test]
    fn test_undefined_control_sequence() {
        let (id, message) = error_of(&TexInput::default(), r"\nosuchmacro");
        assert_eq!(id, "UndefinedControlSequence");
        assert_eq!(message, r"Undefined control sequence \nosuchmacro");
    }

    #[test]
    fn test_recursive_def_terminates() {
        let (id, _) = error_of(&TexInput::default(), r"\def\x{\x}\x");
        assert_eq!(id, "MaxMacroSub1");
    }

    #[test]
    fn test_growing_macro_terminates() {
        let (id, _) = error_of(&TexInput::default(), r"\newcommand{\a}{\a\a}\a");
        assert!(id == "MaxMacroSub1" || id == "MaxBufferSize", "got {}", id);
    }

    #[test]
    fn test_mutual_recursion_terminates() {
        let session = TexInput::with_options(ParserOptions::strict_limits(50));
        let (id, _) = error_of(&session, r"\def\a{\b}\def\b{\a}\a");
        assert_eq!(id, "MaxMacroSub1");
    }

    #[test]
    fn test_recursive_environment_terminates() {
        let (id, _) = error_of(
            &TexInput::default(),
            r"\newenvironment{loop}{\begin{loop}}{\end{loop}}\begin{loop}\end{loop}",
        );
        assert!(id.starts_with("MaxMacroSub") || id == "MaxBufferSize", "got {}", id);
    }

    #[test]
    fn test_double_subscripts() {
        let (id, message) = error_of(&TexInput::default(), "x_1_2");
        assert_eq!(id, "DoubleSubscripts");
        assert_eq!(message, "Double subscripts: use braces to clarify");
    }

    #[test]
    fn test_script_without_argument() {
        let session = TexInput::default();
        let (id, message) = error_of(&session, "x^^2");
        assert_eq!(id, "MissingOpenForSup");
        assert_eq!(message, "Missing open brace for superscript");

        let (id, _) = error_of(&session, "x__2");
        assert_eq!(id, "MissingOpenForSub");

        let (id, message) = error_of(&session, "x^");
        assert_eq!(id, "MissingScript");
        assert_eq!(message, "Missing superscript or subscript argument");
    }

    #[test]
    fn test_environment_mismatch() {
        let session = TexInput::default();
        let (id, message) = error_of(&session, r"\begin{matrix}a\end{pmatrix}");
        assert_eq!(id, "EnvBadEnd");
        assert_eq!(message, r"\begin{matrix} ended with \end{pmatrix}");

        let (id, message) = error_of(&session, r"\begin{matrix}a");
        assert_eq!(id, "EnvMissingEnd");
        assert_eq!(message, r"Missing \end{matrix}");
    }

    #[test]
    fn test_misplaced_alignment() {
        let (id, message) = error_of(&TexInput::default(), "a & b");
        assert_eq!(id, "Misplaced");
        assert_eq!(message, "Misplaced &");
    }

    #[test]
    fn test_cases_has_two_columns() {
        let session = TexInput::default();
        assert!(session.parse(r"\begin{cases}a&b\\c&d\end{cases}").is_ok());
        let (id, _) = error_of(&session, r"\begin{cases}a&b&c\end{cases}");
        assert_eq!(id, "ExtraAlignTab");
    }

    #[test]
    fn test_environment_count_is_limited() {
        let session = TexInput::with_options(ParserOptions::strict_limits(5));
        let input = r"\begin{matrix}a\end{matrix}".repeat(10);
        let (id, _) = error_of(&session, &input);
        assert_eq!(id, "MaxMacroSub2");
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let session = TexInput::default();
        let deep = format!("{}x{}", "{".repeat(5000), "}".repeat(5000));
        let (id, _) = error_of(&session, &deep);
        assert_eq!(id, "MaxMacroSub1");

        let moderate = format!("{}x{}", "{".repeat(100), "}".repeat(100));
        assert!(session.parse(&moderate).is_ok());
    }

    #[test]
    fn test_error_offset() {
        let err = TexInput::default().parse("ab^2^3").unwrap_err();
        assert!(err.offset().is_some());
    }

    #[test]
    fn test_recover_builds_merror() {
        let tree = TexInput::default().parse_or_recover("x^2^3");
        assert!(tree.is_error());
        let result = tree.to_mathml();
        assert!(result.contains("<merror"));
        assert!(result.contains("x^2^3"));
    }
}

// ============================================================================
// Packages and the registry
// ============================================================================

mod packages {
    use super::*;
    use pretty_assertions::assert_eq;
    use texmml::core::HandlerKind;
    use texmml::features::{build_registry, resolve_packages};
    use texmml::Registry;

    #[test]
    fn test_bra_fences() {
        let session = with_packages(&["base", "braket"]);
        let tree = session.parse(r"\bra{x}").unwrap();
        let row = find(tree.root_ref(), NodeKind::Mrow).expect("a row");
        let children = row.elements();
        assert_eq!(children.len(), 3);

        assert_eq!(children[0].kind(), NodeKind::Mo);
        assert_eq!(children[0].text(), "\u{27E8}");
        assert_eq!(children[0].attribute("fence"), Some("true"));

        assert_eq!(children[1].kind(), NodeKind::TeXAtom);
        assert_eq!(children[1].tex_class(), TexClass::Ord);
        let identifier = find(children[1], NodeKind::Mi).expect("an identifier");
        assert_eq!(identifier.text(), "x");

        assert_eq!(children[2].kind(), NodeKind::Mo);
        assert_eq!(children[2].text(), "|");
        assert_eq!(children[2].attribute("fence"), Some("true"));
    }

    #[test]
    fn test_qty_fences_its_content() {
        let session = with_packages(&["physics"]);
        let tree = session.parse(r"\qty(a \over b)").unwrap();
        let frac = find(tree.root_ref(), NodeKind::Mfrac).expect("a fraction");
        let row = frac.parent().expect("a fenced row");
        let children = row.elements();
        assert_eq!(row.kind(), NodeKind::Mrow);
        assert_eq!(children.first().map(|c| c.text()), Some("(".to_string()));
        assert_eq!(children.last().map(|c| c.text()), Some(")".to_string()));
    }

    #[test]
    fn test_qty_closes_over_style_changes() {
        let session = with_packages(&["physics", "color"]);
        for input in [r"\qty(x \displaystyle y)", r"\qty(x \color{red} y)", r"\qty[a \over b]"] {
            assert!(session.parse(input).is_ok(), "input: {}", input);
        }
    }

    #[test]
    fn test_bra_needs_package() {
        let (id, _) = error_of(&TexInput::default(), r"\bra{x}");
        assert_eq!(id, "UndefinedControlSequence");
    }

    #[test]
    fn test_requires_are_loaded() {
        let session = with_packages(&["physics"]);
        assert!(session.packages().contains(&"base"));
        assert!(session.packages().contains(&"boldsymbol"));
        assert!(session.parse(r"\qty(\frac{a}{b})").is_ok());
    }

    #[test]
    fn test_unknown_package() {
        let err = TexInput::builder().package("nosuch").build().unwrap_err();
        assert!(err.to_string().contains("nosuch"));
    }

    #[test]
    fn test_ams_environments() {
        let session = TexInput::default();
        let result = session
            .parse(r"\begin{align} a &= b \\ c &= d \end{align}")
            .unwrap()
            .to_mathml();
        assert!(result.contains("<mtable"));
        assert!(session.parse(r"\operatorname{sgn} x").is_ok());
        assert!(session.parse(r"\xrightarrow[a]{b}").is_ok());
    }

    #[test]
    fn test_color_and_cancel() {
        let session = with_packages(&["base", "color", "cancel"]);
        let result = session.parse(r"\textcolor{red}{x} \cancel{y}").unwrap().to_mathml();
        assert!(result.contains("mathcolor=\"#FF0000\""));
        assert!(result.contains("updiagonalstrike"));

        let boxed = session.parse(r"\colorbox{yellow}{if $x>0$}").unwrap().to_mathml();
        assert!(boxed.contains("mathbackground"));
        assert!(boxed.contains("<mtext"));
        assert!(boxed.contains(">x</mi>"));
    }

    #[test]
    fn test_noundefined_marks_unknown() {
        let session = with_packages(&["base", "noundefined"]);
        let result = session.parse(r"\nosuchmacro").unwrap().to_mathml();
        assert!(result.contains("<mtext"));
        assert!(result.contains(r"\nosuchmacro"));
    }

    #[test]
    fn test_noerrors_renders_errors() {
        let session = with_packages(&["base", "noerrors"]);
        assert!(session.parse("x^2^3").is_err());
        let tree = session.render("x^2^3").unwrap();
        assert!(tree.is_error());
    }

    #[test]
    fn test_configmacros() {
        let options = ParserOptions::new().with_macro("RR", r"\mathbb{R}", 0);
        let session = TexInput::builder()
            .packages(&["base", "configmacros"])
            .options(options)
            .build()
            .unwrap();
        let result = session.parse(r"x \in \RR").unwrap().to_mathml();
        assert!(result.contains("double-struck"));
    }

    #[test]
    fn test_idempotent_merge() {
        let options = ParserOptions::default();
        let configs = resolve_packages(&["base", "ams", "braket"]).unwrap();
        let registry = build_registry(&configs, &options).unwrap();
        let merged = Registry::merge(&[&registry, &registry]);

        assert_eq!(merged.symbol_count(), registry.symbol_count());
        for name in ["frac", "alpha", "bra", "dfrac", "left", "nosuch"] {
            assert_eq!(
                format!("{:?}", merged.lookup(HandlerKind::Macro, name)),
                format!("{:?}", registry.lookup(HandlerKind::Macro, name)),
                "macro {}",
                name
            );
        }
        for name in ["matrix", "align", "nosuch"] {
            assert_eq!(
                merged.lookup_environment(name).is_some(),
                registry.lookup_environment(name).is_some()
            );
        }
        for c in ['x', '+', '1', '('] {
            assert_eq!(
                format!("{:?}", merged.lookup_character(c)),
                format!("{:?}", registry.lookup_character(c))
            );
        }
    }

    #[test]
    fn test_later_package_wins() {
        let session = with_packages(&["base", "braket"]);
        let shadowed = session.registry().lookup_macro("bra").is_some();
        assert!(shadowed);
        let plain = TexInput::default();
        assert!(plain.registry().lookup_macro("bra").is_none());
    }
}
