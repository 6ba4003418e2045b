use glam::{Mat4, Vec2};
use kestrel_vr::cursor::Side;
use kestrel_vr::handler::HandlerType;
use kestrel_vr::handlers::builtin_registry;
use kestrel_vr::menu::{
    populate, resolve_sector, MenuCommit, MenuEntry, MenuHandle, MenuType, RadialMenu, Sector, MAX_ITEMS,
};
use kestrel_vr::registry::HandlerRegistry;
use kestrel_vr::render::IconRecorder;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, TAU};
use std::rc::Rc;

const HAND: Side = Side::Right;

fn setup() -> (MenuHandle, HandlerRegistry) {
    let menu = RadialMenu::default().into_handle();
    let registry = builtin_registry(&menu);
    (menu, registry)
}

fn towards(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.sin(), radians.cos())
}

#[test]
fn eight_item_menu_invokes_the_top_item() {
    let (menu, registry) = setup();
    let mut menu = menu.borrow_mut();
    assert!(menu.open(HAND, MenuType::Main8, &registry));
    assert_eq!(menu.state(HAND).count(), 7);

    menu.update(HAND, Vec2::new(0.0, 1.0));
    assert_eq!(menu.state(HAND).angle(), Some(0.0));
    assert_eq!(menu.state(HAND).highlight_index(), 0);

    let alt = registry.get_handler(HandlerType::Alt, None).expect("alt builtin");
    match menu.commit(HAND, &registry) {
        MenuCommit::Invoke { handler_type, handler } => {
            assert_eq!(handler_type, HandlerType::Alt);
            assert!(Rc::ptr_eq(&handler, &alt), "commit hands back the registry instance");
        }
        other => panic!("expected an invoke, got {other:?}"),
    }
    assert!(!menu.is_open(HAND), "invoking an item closes the menu");
}

#[test]
fn exit_at_root_closes_without_going_negative() {
    let (menu, registry) = setup();
    let mut menu = menu.borrow_mut();
    assert!(menu.open_root(HAND, None, &registry));
    assert_eq!(menu.state(HAND).menu_type(), MenuType::Main12);
    assert_eq!(menu.state(HAND).depth(), 0);

    menu.update(HAND, Vec2::new(0.0, -1.0));
    assert_eq!(menu.state(HAND).hovered(), Some(Sector::Exit));
    assert_eq!(menu.state(HAND).highlight_index(), 11, "exit highlights the exit slot");
    assert!(matches!(menu.commit(HAND, &registry), MenuCommit::Exited { depth: 0, closed: true }));
    assert_eq!(menu.state(HAND).depth(), 0);
    assert!(!menu.is_open(HAND));

    assert!(matches!(menu.commit(HAND, &registry), MenuCommit::Ignored), "closed menus ignore commits");
    assert_eq!(menu.state(HAND).depth(), 0);
}

#[test]
fn submenu_nests_and_exit_returns_to_parent() {
    let (menu, registry) = setup();
    let mut menu = menu.borrow_mut();
    assert!(menu.open(HAND, MenuType::Main8, &registry));

    menu.update(HAND, towards(135.0));
    assert_eq!(menu.state(HAND).hovered(), Some(Sector::Item(6)));
    match menu.commit(HAND, &registry) {
        MenuCommit::Submenu { menu: opened, depth } => {
            assert_eq!(opened, MenuType::SwitchTool);
            assert_eq!(depth, 1);
        }
        other => panic!("expected a submenu, got {other:?}"),
    }
    let state = menu.state(HAND);
    assert!(state.is_open(), "submenus keep the menu open");
    assert_eq!(state.menu_type(), MenuType::SwitchTool);
    assert_eq!(state.depth(), 1);
    assert_eq!(state.highlight_index(), -1, "a new level starts unhighlighted");
    assert_eq!(state.angle(), None);

    menu.update(HAND, Vec2::new(0.0, -1.0));
    assert!(matches!(menu.commit(HAND, &registry), MenuCommit::Exited { depth: 0, closed: false }));
    assert!(menu.is_open(HAND), "exit from a submenu reopens the parent");
    assert_eq!(menu.state(HAND).menu_type(), MenuType::Main8);
    assert_eq!(menu.state(HAND).depth(), 0);
}

#[test]
fn depth_stack_round_trip_never_goes_negative() {
    let (menu, registry) = setup();
    let mut menu = menu.borrow_mut();
    let down = Vec2::new(0.0, -1.0);

    assert!(menu.open_root(HAND, None, &registry));
    assert!(menu.open(HAND, MenuType::Main8, &registry));
    assert_eq!((menu.state(HAND).depth(), menu.is_open(HAND)), (0, true));

    menu.update(HAND, towards(135.0));
    assert!(matches!(menu.commit(HAND, &registry), MenuCommit::Submenu { menu: MenuType::SwitchTool, depth: 1 }));
    assert_eq!((menu.state(HAND).depth(), menu.is_open(HAND)), (1, true));

    menu.update(HAND, down);
    assert!(matches!(menu.commit(HAND, &registry), MenuCommit::Exited { depth: 0, closed: false }));
    assert_eq!(menu.state(HAND).menu_type(), MenuType::Main8);
    assert_eq!((menu.state(HAND).depth(), menu.is_open(HAND)), (0, true));

    menu.update(HAND, down);
    assert!(matches!(menu.commit(HAND, &registry), MenuCommit::Exited { depth: 0, closed: true }));
    assert_eq!((menu.state(HAND).depth(), menu.is_open(HAND)), (0, false));

    menu.update(HAND, down);
    assert!(matches!(menu.commit(HAND, &registry), MenuCommit::Ignored), "a closed menu has nothing to exit");
    assert_eq!((menu.state(HAND).depth(), menu.is_open(HAND)), (0, false));
}

#[test]
fn open_is_idempotent_and_keeps_depth() {
    let (menu, registry) = setup();
    let mut menu = menu.borrow_mut();
    assert!(menu.open(HAND, MenuType::Main8, &registry));
    menu.update(HAND, towards(135.0));
    menu.commit(HAND, &registry);
    assert_eq!(menu.state(HAND).depth(), 1);

    let before = menu.state(HAND).clone();
    assert!(menu.open(HAND, MenuType::SwitchTool, &registry));
    assert!(menu.open(HAND, MenuType::SwitchTool, &registry));
    let after = menu.state(HAND);
    assert_eq!(after.depth(), before.depth());
    assert_eq!(after.count(), before.count());
    assert_eq!(after.items(), before.items());

    assert!(menu.open_root(HAND, None, &registry));
    assert_eq!(menu.state(HAND).depth(), 0, "a fresh root session starts at depth 0");
}

#[test]
fn degenerate_sticks_keep_the_last_angle() {
    let (menu, registry) = setup();
    let mut menu = menu.borrow_mut();
    assert!(menu.open(HAND, MenuType::Main8, &registry));

    menu.update(HAND, Vec2::ZERO);
    assert_eq!(menu.state(HAND).angle(), None);
    assert!(matches!(menu.commit(HAND, &registry), MenuCommit::Ignored), "no angle, no commit");
    assert!(menu.is_open(HAND), "an ignored commit changes nothing");

    menu.update(HAND, towards(90.0));
    let angle = menu.state(HAND).angle();
    let highlight = menu.state(HAND).highlight_index();
    menu.update(HAND, Vec2::ZERO);
    menu.update(HAND, Vec2::new(f32::NAN, 1.0));
    assert_eq!(menu.state(HAND).angle(), angle);
    assert_eq!(menu.state(HAND).highlight_index(), highlight);
    assert_eq!(menu.state(HAND).hovered(), Some(Sector::Item(2)));
}

#[test]
fn population_matches_layout_for_every_menu() {
    let (_menu, registry) = setup();
    for menu in MenuType::ALL {
        let population = populate(menu, &registry).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(population.count(), menu.spec().count(), "{menu}");
        assert_eq!(population.layout.count(), population.count(), "{menu}");
        assert!(population.count() <= population.layout.capacity(), "{menu}");
    }
}

#[test]
fn unregistered_named_items_become_commands() {
    let (_menu, registry) = setup();
    let population = populate(MenuType::TsSelect, &registry).expect("populate");
    assert_eq!(population.entries[0], MenuEntry::Command("select.mode.cursor"));
    let knife = populate(MenuType::TsKnife, &registry).expect("populate");
    assert_eq!(knife.entries[1], MenuEntry::Placeholder);
}

#[test]
fn sector_resolution_is_total_and_deterministic() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..4000 {
        let angle = rng.gen_range(-TAU..TAU);
        for count in 1..=MAX_ITEMS {
            let sector = resolve_sector(count, angle);
            assert_eq!(sector, resolve_sector(count, angle), "deterministic for {count} at {angle}");
            if let Sector::Item(index) = sector {
                assert!(index < count, "{count} items resolved to item {index} at {angle}");
            }
        }
    }
    assert_eq!(resolve_sector(7, TAU), resolve_sector(7, 0.0), "full turns wrap");
    assert_eq!(resolve_sector(0, 0.0), Sector::Empty);
}

#[test]
fn sector_boundaries_belong_to_the_next_sector() {
    assert_eq!(resolve_sector(7, PI / 8.0), Sector::Item(4));
    assert_eq!(resolve_sector(7, PI / 8.0 - 1e-4), Sector::Item(0));
    assert_eq!(resolve_sector(7, -PI / 8.0), Sector::Item(0));
}

#[test]
fn action_settings_commits_keep_the_menu_open() {
    let (menu, registry) = setup();
    let mut menu = menu.borrow_mut();
    assert!(!menu.open_action_settings(Side::Left, HandlerType::Measure, &registry), "measure has none");
    assert!(menu.open_action_settings(Side::Left, HandlerType::Transform, &registry));
    assert_eq!(menu.state(Side::Left).menu_type(), MenuType::AsTransform);
    assert!(menu.state(Side::Left).action_settings());

    menu.update(Side::Left, towards(90.0));
    assert!(matches!(menu.commit(Side::Left, &registry), MenuCommit::Command("transform.constraint.z")));
    assert!(menu.is_open(Side::Left));
    assert!(
        matches!(menu.center_action(Side::Left, &registry), Some(MenuEntry::Command("transform.space.cycle"))),
        "center press cycles the transform space"
    );

    assert!(menu.close_action_settings(Side::Left));
    assert!(!menu.is_open(Side::Left));
    assert!(!menu.close_action_settings(Side::Left), "second close is a no-op");
    assert!(menu.center_action(Side::Left, &registry).is_none());
}

#[test]
fn extrude_settings_use_the_lateral_layout() {
    let (menu, registry) = setup();
    let mut menu = menu.borrow_mut();
    assert!(menu.open_action_settings(HAND, HandlerType::Extrude, &registry));
    let layout = menu.state(HAND).layout().expect("layout");
    assert!(!layout.has_exit());

    menu.update(HAND, towards(90.0));
    assert!(matches!(menu.commit(HAND, &registry), MenuCommit::Command("extrude.amount.increase")));
    menu.update(HAND, towards(-90.0));
    assert!(matches!(menu.commit(HAND, &registry), MenuCommit::Command("extrude.amount.decrease")));
    menu.update(HAND, towards(0.0));
    assert_eq!(menu.state(HAND).highlight_index(), -1, "empty sectors clear the highlight");
    assert!(matches!(menu.commit(HAND, &registry), MenuCommit::Empty));
    assert!(menu.is_open(HAND));
}

#[test]
fn hands_keep_separate_menu_state() {
    let (menu, registry) = setup();
    let mut menu = menu.borrow_mut();
    assert!(menu.open(Side::Left, MenuType::Main8, &registry));
    assert!(!menu.is_open(Side::Right));
    menu.update(Side::Left, towards(90.0));
    assert_eq!(menu.state(Side::Right).angle(), None);
}

#[test]
fn render_draws_items_and_highlight() {
    let (menu, registry) = setup();
    let mut recorder = IconRecorder::new();
    menu.borrow().render(HAND, Mat4::IDENTITY, &mut recorder);
    assert!(recorder.icons.is_empty(), "closed menus draw nothing");

    let mut menu = menu.borrow_mut();
    assert!(menu.open(HAND, MenuType::Main8, &registry));
    menu.update(HAND, Vec2::new(0.0, 1.0));
    let before = menu.state(HAND).clone();
    menu.render(HAND, Mat4::IDENTITY, &mut recorder);

    assert_eq!(recorder.icons.len(), 8, "seven items plus the exit icon");
    let labels = recorder.labels();
    assert!(labels.contains(&"exit"));
    assert!(labels.contains(&"menu:SWITCHTOOL"));
    let highlighted = recorder.highlighted().expect("highlighted icon");
    assert_eq!(highlighted.label, "ALT");
    assert!(highlighted.style.scale > 1.0);
    assert_eq!(menu.state(HAND).highlight_index(), before.highlight_index(), "render is read-only");
}
