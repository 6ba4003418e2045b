use kestrel_vr::cursor::Side;
use kestrel_vr::handler::HandlerType;
use kestrel_vr::input::{ButtonLayout, Buttons};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn remapped_buttons_override_defaults() {
    let mut temp = NamedTempFile::new().expect("temp layout config");
    write!(
        temp,
        r#"{{"right":{{"trigger":"KNIFE","b":"REDO","thumbrest":""}},"left":{{"pedal":"UNDO","grip":"NAVI_TELEPORT"}}}}"#
    )
    .expect("write layout config");

    let layout = ButtonLayout::load(temp.path()).expect("load layout");

    assert_eq!(layout.tool_name(Side::Right), Some("KNIFE"), "trigger binding is the tool");
    assert_eq!(layout.binding(Side::Right, Buttons::SECONDARY), Some("REDO"), "b aliases secondary");
    assert_eq!(layout.binding(Side::Right, Buttons::THUMBREST), None, "empty names unbind");
    assert_eq!(layout.binding(Side::Right, Buttons::GRIP), Some("NAVI_GRABAIR"), "untouched buttons keep defaults");
    assert_eq!(layout.binding(Side::Left, Buttons::GRIP), Some("NAVI_TELEPORT"));
    assert_eq!(layout.tool_name(Side::Left), Some("TRANSFORM"));
}

#[test]
fn broken_files_fall_back_to_defaults() {
    let mut temp = NamedTempFile::new().expect("temp layout config");
    write!(temp, "{{ not json").expect("write broken config");

    let err = ButtonLayout::load(temp.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse layout file"), "error names the file: {err}");

    let layout = ButtonLayout::load_or_default(temp.path());
    assert_eq!(layout.binding(Side::Right, Buttons::PRIMARY), Some("MENU_RIGHT"));
    assert_eq!(layout.binding(Side::Left, Buttons::PRIMARY), Some("MENU_LEFT"));
}

#[test]
fn set_tool_rebinds_the_trigger() {
    let mut layout = ButtonLayout::default();
    layout.set_tool(Side::Left, HandlerType::Measure);
    assert_eq!(layout.tool_name(Side::Left), Some("MEASURE"));
    assert_eq!(layout.tool_name(Side::Right), Some("SELECT_RAYCAST"), "other hand untouched");
}

#[test]
fn bound_buttons_come_back_in_bit_order() {
    let layout = ButtonLayout::default();
    let pressed = Buttons::THUMBREST | Buttons::GRIP | Buttons::TRIGGER | Buttons::STICK_TOUCH;
    let bound: Vec<_> = layout.bound_in(Side::Right, pressed).collect();
    assert_eq!(
        bound,
        vec![(Buttons::TRIGGER, "SELECT_RAYCAST"), (Buttons::GRIP, "NAVI_GRABAIR"), (Buttons::THUMBREST, "SHIFT")],
        "unbound stick touch is skipped"
    );
}
