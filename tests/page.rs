use era_morph::theme::VARIABLES;

const PAGE: &str = include_str!("../static/index.html");

fn css_variables_read(page: &str) -> Vec<&str> {
    page.split("var(")
        .skip(1)
        .filter_map(|rest| rest.split(|c| c == ')' || c == ',').next())
        .map(str::trim)
        .collect()
}

#[test]
fn page_only_reads_written_variables() {
    let read = css_variables_read(PAGE);
    assert!(!read.is_empty());
    for name in &read {
        assert!(VARIABLES.contains(name), "{name} is never written");
    }
}

#[test]
fn every_theme_variable_is_styled() {
    let read = css_variables_read(PAGE);
    for name in VARIABLES {
        assert!(read.contains(&name), "{name} is not used by the page");
    }
}
