use fluxbit::cli::{parse_from, HelpFormat, HelpRequest, OptionCollector};
use fluxbit::config::{self, PropertyValue, SectionKind};
use fluxbit::error::CliError;
use fluxbit::plugin::PluginKind;
use fluxbit::state::AppState;

fn collect(args: &[&str]) -> Result<fluxbit::cli::Collected, CliError> {
    let argv = std::iter::once("fluxbit").chain(args.iter().copied());
    let (_, options) = parse_from(argv)?;
    OptionCollector::collect(options)
}

#[test]
fn test_flags_build_sections_in_order() {
    let collected = collect(&[
        "-i", "cpu", "-t", "cpu.local", "-p", "interval_sec=2", "-F", "grep", "-p",
        "regex=log aa", "-m", "cpu.*", "-o", "stdout", "-m", "*",
    ])
    .unwrap();

    let kinds: Vec<_> = collected.tree.sections.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![SectionKind::Input, SectionKind::Filter, SectionKind::Output]
    );
    assert_eq!(
        collected.tree.sections[1].properties[1],
        ("regex".to_string(), PropertyValue::from("log aa"))
    );
    assert_eq!(collected.current, Some(2));
    assert_eq!(collected.help, None);
}

#[test]
fn test_service_flags_do_not_move_the_cursor() {
    let collected = collect(&["-o", "null", "-f", "3", "-b", "/var/buf", "-m", "*"]).unwrap();
    let tree = &collected.tree;

    let output = tree.plugin_sections(PluginKind::Output).next().unwrap();
    assert_eq!(output.properties.len(), 2);
    let service = tree.sections_of(SectionKind::Service).next().unwrap();
    assert_eq!(service.properties.len(), 2);
}

#[test]
fn test_help_json_after_plugin_targets_plugin() {
    let collected = collect(&["-o", "http", "-J"]).unwrap();
    assert_eq!(
        collected.help,
        Some(HelpRequest::Plugin {
            kind: PluginKind::Output,
            name: "http".into(),
            format: HelpFormat::Json,
        })
    );

    let collected = collect(&["-h"]).unwrap();
    assert_eq!(collected.help, Some(HelpRequest::General(HelpFormat::Text)));
}

#[test]
fn test_property_without_equals_is_rejected() {
    let err = collect(&["-i", "cpu", "-p", "interval_sec"]).unwrap_err();
    assert!(matches!(err, CliError::MalformedProperty(_)));
}

#[test]
fn test_daemon_flag_sets_service_property() {
    let collected = collect(&["-i", "cpu", "-d", "-o", "null"]).unwrap();
    let service = collected
        .tree
        .sections_of(SectionKind::Service)
        .next()
        .unwrap();
    assert_eq!(
        service.properties,
        vec![("daemon".to_string(), PropertyValue::from("on"))]
    );
    assert_eq!(collected.tree.sections[0].properties.len(), 1);

    let mut state = AppState::default();
    config::merge(None, collected.tree, &mut state).unwrap();
    assert!(state.service.daemon);
}
