use super::*;

fn lock<T>(m: &Mutex<T>) -> parking_lot::MutexGuard<'_, T> {
    m.lock()
}

// 11 = red/S, 12 = red/M, 13 = blue/S, 14 = blue/M (out of stock).
fn colors() -> Vec<SkuOption> {
    vec![
        SkuOption::new("red", ["11", "12"]),
        SkuOption::new("blue", ["13"]).with_unavailable(["14"]),
    ]
}

fn sizes() -> Vec<SkuOption> {
    vec![
        SkuOption::new("S", ["11", "13"]),
        SkuOption::new("M", ["12"]).with_unavailable(["14"]),
    ]
}

fn idle() -> OptionState {
    OptionState::default()
}

#[test]
fn connect_registers_group_with_store() {
    let mut store = SelectionStore::new("prod-1");
    let _color = OptionGroup::connect("color", colors(), &mut store).unwrap();
    let _size = OptionGroup::connect("size", sizes(), &mut store).unwrap();
    assert_eq!(store.option_group_count(), 2);
    assert!(store.sku_options().is_empty());
}

#[test]
fn blank_name_fails_fast() {
    let mut store = SelectionStore::new("prod-1");
    let err = OptionGroup::connect("  ", colors(), &mut store).unwrap_err();
    assert_eq!(err, SelectionError::MissingOptionGroupName);
    assert_eq!(store.option_group_count(), 0);
}

#[test]
fn clicks_in_both_groups_resolve_sku() {
    let mut store = SelectionStore::new("prod-1");
    let color = OptionGroup::connect("color", colors(), &mut store).unwrap();
    let size = OptionGroup::connect("size", sizes(), &mut store).unwrap();

    assert!(color.click(0, &mut store).unwrap());
    assert_eq!(store.selected_sku_id(), None);
    assert!(size.click(0, &mut store).unwrap());

    assert_eq!(store.selected_sku_id(), Some("11"));
    assert_eq!(color.selected_value().as_deref(), Some("red"));
    assert_eq!(size.selected_value().as_deref(), Some("S"));
}

#[test]
fn other_group_choice_marks_unreachable_options() {
    let mut store = SelectionStore::new("prod-1");
    let color = OptionGroup::connect("color", colors(), &mut store).unwrap();
    let size = OptionGroup::connect("size", sizes(), &mut store).unwrap();

    color.click(1, &mut store).unwrap();

    // Blue/M exists only out of stock.
    assert_eq!(
        size.states(),
        vec![
            idle(),
            OptionState {
                unavailable: true,
                ..idle()
            }
        ]
    );
    // A group never constrains itself.
    assert_eq!(
        color.states(),
        vec![
            idle(),
            OptionState {
                selected: true,
                ..idle()
            }
        ]
    );
}

#[test]
fn option_with_no_matching_sku_is_disabled() {
    let mut store = SelectionStore::new("prod-1");
    let color = OptionGroup::connect(
        "color",
        vec![
            SkuOption::new("red", ["11", "12"]),
            SkuOption::new("green", ["20"]),
        ],
        &mut store,
    )
    .unwrap();
    let size = OptionGroup::connect("size", sizes(), &mut store).unwrap();

    size.click(0, &mut store).unwrap();

    let states = color.states();
    assert!(!states[0].disabled && !states[0].unavailable);
    assert!(states[1].disabled);
    assert!(!states[1].unavailable);
    assert!(!color.click(1, &mut store).unwrap(), "disabled option ignores clicks");
    assert_eq!(color.selected_value(), None);
}

#[test]
fn unavailable_option_ignores_clicks() {
    let mut store = SelectionStore::new("prod-1");
    let color = OptionGroup::connect("color", colors(), &mut store).unwrap();
    let size = OptionGroup::connect("size", sizes(), &mut store).unwrap();

    color.click(1, &mut store).unwrap();

    assert!(!size.click(1, &mut store).unwrap());
    assert!(!store.sku_options().contains_key("size"));
}

#[test]
fn clicking_deselects_siblings() {
    let mut store = SelectionStore::new("prod-1");
    let color = OptionGroup::connect("color", colors(), &mut store).unwrap();

    color.click(0, &mut store).unwrap();
    color.click(1, &mut store).unwrap();

    let selected: Vec<bool> = color.states().iter().map(|s| s.selected).collect();
    assert_eq!(selected, vec![false, true]);
    assert_eq!(
        store.sku_options()["color"],
        vec!["13".to_owned(), "14".to_owned()]
    );
}

#[test]
fn preselected_option_pushes_full_id_set() {
    let mut store = SelectionStore::new("prod-1");
    let options = vec![
        SkuOption::new("red", ["11", "12"]),
        SkuOption::new("blue", ["13"]).with_unavailable(["14"]).preselected(),
    ];
    let color = OptionGroup::connect("color", options, &mut store).unwrap();

    assert_eq!(color.selected_value().as_deref(), Some("blue"));
    assert_eq!(
        store.sku_options()["color"],
        vec!["13".to_owned(), "14".to_owned()]
    );
}

#[test]
fn late_group_sees_earlier_preselection() {
    let mut store = SelectionStore::new("prod-1");
    let options = vec![
        SkuOption::new("red", ["11", "12"]),
        SkuOption::new("blue", ["13"]).preselected(),
    ];
    let _color = OptionGroup::connect("color", options, &mut store).unwrap();
    let size = OptionGroup::connect("size", sizes(), &mut store).unwrap();

    let states = size.states();
    assert!(!states[0].disabled);
    assert!(states[1].disabled, "M has no blue SKU at all");
}

#[test]
fn preselections_in_every_group_resolve_without_clicks() {
    let mut store = SelectionStore::new("prod-1");
    let color_opts = vec![SkuOption::new("red", ["11", "12"]).preselected()];
    let size_opts = vec![SkuOption::new("M", ["12"]).preselected()];
    let _color = OptionGroup::connect("color", color_opts, &mut store).unwrap();
    let _size = OptionGroup::connect("size", size_opts, &mut store).unwrap();

    assert_eq!(store.selected_sku_id(), Some("12"));
}

#[test]
fn click_out_of_range_is_an_error() {
    let mut store = SelectionStore::new("prod-1");
    let color = OptionGroup::connect("color", colors(), &mut store).unwrap();
    let err = color.click(9, &mut store).unwrap_err();
    assert_eq!(
        err,
        SelectionError::UnknownOption {
            group: "color".to_owned(),
            index: 9
        }
    );
}

#[test]
fn disconnected_group_stops_tracking() {
    let mut store = SelectionStore::new("prod-1");
    let color = OptionGroup::connect("color", colors(), &mut store).unwrap();
    let size = OptionGroup::connect("size", sizes(), &mut store).unwrap();
    let entries = Arc::clone(&size.entries);

    size.disconnect(&mut store);
    color.click(1, &mut store).unwrap();

    assert!(lock(&entries).iter().all(|e| !e.state.unavailable));
}

#[test]
fn connect_in_scope_resolves_store_across_shadow_root() {
    let mut tree = NodeTree::new();
    let product = tree.add_root();
    let shadow = tree.attach_shadow(product);
    let picker = tree.add_child(shadow);

    let token = ScopeToken::<SelectionStore>::new();
    let mut registry = ScopeRegistry::new();
    registry.provide(product, &token, SelectionStore::new("prod-1"));

    let color =
        OptionGroup::connect_in_scope("color", colors(), &tree, &mut registry, picker, &token)
            .unwrap();
    let store = registry.resolve_mut(&tree, picker, &token).unwrap();
    color.click(0, store).unwrap();

    assert_eq!(store.option_group_count(), 1);
    assert_eq!(store.selected_sku_id(), None, "two red SKUs remain");
}

#[test]
fn connect_in_scope_without_provider_fails_fast() {
    let mut tree = NodeTree::new();
    let orphan = tree.add_root();
    let token = ScopeToken::<SelectionStore>::new();
    let mut registry = ScopeRegistry::new();

    let err = OptionGroup::connect_in_scope("size", sizes(), &tree, &mut registry, orphan, &token)
        .unwrap_err();
    assert_eq!(
        err,
        SelectionError::StoreNotFound {
            group: "size".to_owned()
        }
    );
}
