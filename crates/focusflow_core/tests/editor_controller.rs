use focusflow_core::editor::dom::Position;
use focusflow_core::editor::PasteError;
use focusflow_core::editor::{InputOutcome, SyncOutcome, CHECKBOX_LINE_HTML};
use focusflow_core::{
    current_note, filter_notes, ClipboardItem, Command, ImagePasteOutcome, KeyEvent, KeyOutcome,
    ManualClock, MemoryKeyValueStore, NoteFilter, NotePatch, RichTextController, SequentialIds,
    Store, StoreConfig,
};

fn loaded_store() -> Store<MemoryKeyValueStore> {
    let mut store = Store::with_parts(
        MemoryKeyValueStore::new(),
        StoreConfig::default(),
        Box::new(ManualClock::new(0)),
        Box::new(SequentialIds::new("n")),
    );
    store.load();
    store
}

fn note_with(store: &mut Store<MemoryKeyValueStore>, content: &str) -> String {
    let id = store.add_note();
    store.update_note(&id, NotePatch::content(content));
    id
}

fn bind(store: &Store<MemoryKeyValueStore>, id: &str) -> RichTextController {
    let mut controller = RichTextController::new();
    controller.switch_note(store.data().note(id).unwrap());
    controller.surface_mut().unwrap().move_caret_to_end();
    controller
}

fn content_of(store: &Store<MemoryKeyValueStore>, id: &str) -> String {
    store.data().note(id).unwrap().content.clone()
}

#[test]
fn typed_todo_trigger_becomes_one_checkbox_line() {
    let mut store = loaded_store();
    let id = store.add_note();
    let mut controller = bind(&store, &id);

    controller.surface_mut().unwrap().insert_text("/todo");
    assert_eq!(controller.handle_input(&mut store), InputOutcome::ExpandedTodo);

    let content = content_of(&store, &id);
    assert!(!content.contains("/todo"));
    assert_eq!(content.matches(r#"type="checkbox""#).count(), 1);

    let echoed = store.data().note(&id).unwrap();
    assert_eq!(controller.sync_from_note(echoed), SyncOutcome::SkippedInternal);
}

#[test]
fn todo_trigger_after_text_keeps_the_text() {
    let mut store = loaded_store();
    let id = note_with(&mut store, "<div>Buy milk /todo</div>");
    let mut controller = bind(&store, &id);

    assert_eq!(controller.handle_input(&mut store), InputOutcome::ExpandedTodo);
    let content = content_of(&store, &id);
    assert!(content.contains("Buy milk"));
    assert!(!content.contains("/todo"));
    assert_eq!(content.matches(r#"type="checkbox""#).count(), 1);

    let undo = KeyEvent::new("z").with_ctrl();
    assert_eq!(controller.handle_key_down(&undo, &mut store), KeyOutcome::Undo);
    assert_eq!(content_of(&store, &id), "<div>Buy milk /todo</div>");
}

#[test]
fn text_without_trigger_is_only_propagated() {
    let mut store = loaded_store();
    let id = note_with(&mut store, "<div>todo list</div>");
    let mut controller = bind(&store, &id);

    controller.surface_mut().unwrap().insert_text("!");
    assert_eq!(controller.handle_input(&mut store), InputOutcome::Propagated);
    assert_eq!(content_of(&store, &id), "<div>todo list!</div>");
}

#[test]
fn enter_on_empty_checkbox_line_clears_it() {
    let mut store = loaded_store();
    let id = note_with(&mut store, CHECKBOX_LINE_HTML);
    let mut controller = bind(&store, &id);

    let outcome = controller.handle_key_down(&KeyEvent::new("Enter"), &mut store);
    assert_eq!(outcome, KeyOutcome::ClearedCheckboxLine);
    assert!(outcome.prevents_default());
    assert_eq!(content_of(&store, &id), "<div><br></div>");

    let surface = controller.surface().unwrap();
    let caret = surface.caret().unwrap();
    assert_eq!(caret.offset, 0);
    assert_eq!(Some(caret.node), surface.line_at_caret());
}

#[test]
fn enter_on_labelled_checkbox_line_continues_the_list() {
    let mut store = loaded_store();
    let id = note_with(
        &mut store,
        r#"<div><input type="checkbox">&nbsp;milk</div>"#,
    );
    let mut controller = bind(&store, &id);

    let outcome = controller.handle_key_down(&KeyEvent::new("Enter"), &mut store);
    assert_eq!(outcome, KeyOutcome::ContinuedCheckboxLine);

    let content = content_of(&store, &id);
    assert_eq!(content.matches(r#"type="checkbox""#).count(), 2);
    assert!(content.starts_with(r#"<div><input type="checkbox">&nbsp;milk</div>"#));
    assert!(content.ends_with(CHECKBOX_LINE_HTML));

    {
        let surface = controller.surface().unwrap();
        let caret = surface.caret().unwrap();
        let doc = surface.document();
        let new_line = *doc.children(surface.root()).last().unwrap();
        assert_eq!(caret, Position::new(new_line, 1));
        assert!(doc.has_tag(doc.children(new_line)[0], "input"));
    }

    controller.surface_mut().unwrap().insert_text("eggs");
    controller.handle_input(&mut store);
    assert!(content_of(&store, &id).ends_with(r#"<input type="checkbox">eggs&nbsp;</div>"#));
}

#[test]
fn checkbox_handle_from_an_undone_line_is_refused() {
    let mut store = loaded_store();
    let id = note_with(&mut store, "<div>Buy milk</div>");
    let mut controller = bind(&store, &id);

    controller.surface_mut().unwrap().insert_text(" /todo");
    assert_eq!(controller.handle_input(&mut store), InputOutcome::ExpandedTodo);
    let checkbox = {
        let surface = controller.surface().unwrap();
        let doc = surface.document();
        doc.descendants(surface.root())
            .into_iter()
            .find(|node| doc.has_tag(*node, "input"))
            .unwrap()
    };

    let undo = KeyEvent::new("z").with_ctrl();
    assert_eq!(controller.handle_key_down(&undo, &mut store), KeyOutcome::Undo);
    let revision = store.revision();
    assert!(!controller.toggle_checkbox(checkbox, &mut store));
    assert_eq!(store.revision(), revision);
    assert_eq!(content_of(&store, &id), "<div>Buy milk /todo</div>");

    let echoed = store.data().note(&id).unwrap().clone();
    assert_eq!(controller.sync_from_note(&echoed), SyncOutcome::SkippedInternal);
    store.update_note(&id, NotePatch::content("<p>replaced</p>"));
    let replaced = store.data().note(&id).unwrap().clone();
    assert_eq!(controller.sync_from_note(&replaced), SyncOutcome::Resynced);
    assert!(!controller.toggle_checkbox(checkbox, &mut store));
    assert_eq!(content_of(&store, &id), "<p>replaced</p>");
}

#[test]
fn rename_echo_does_not_drop_unreported_typing() {
    let mut store = loaded_store();
    let id = note_with(&mut store, "<div>a</div>");
    let mut controller = bind(&store, &id);

    controller.surface_mut().unwrap().insert_text("bc");
    assert!(controller.rename("Title", &mut store));
    let echoed = store.data().note(&id).unwrap().clone();
    assert_eq!(controller.sync_from_note(&echoed), SyncOutcome::KeptLocalEdits);
    assert_eq!(controller.surface().unwrap().html(), "<div>abc</div>");

    assert_eq!(controller.handle_input(&mut store), InputOutcome::Propagated);
    let stored = store.data().note(&id).unwrap();
    assert_eq!(stored.content, "<div>abc</div>");
    assert_eq!(stored.title, "Title");
}

#[test]
fn enter_on_empty_list_item_outdents() {
    let mut store = loaded_store();
    let id = note_with(&mut store, "<ul><li>one</li><li><br></li></ul>");
    let mut controller = bind(&store, &id);

    let outcome = controller.handle_key_down(&KeyEvent::new("Enter"), &mut store);
    assert_eq!(outcome, KeyOutcome::OutdentedListItem);

    let content = content_of(&store, &id);
    assert!(content.starts_with("<ul><li>one</li></ul>"));
    assert!(!content.contains("<li><br></li>"));
}

#[test]
fn enter_in_plain_line_is_left_to_the_host() {
    let mut store = loaded_store();
    let id = note_with(&mut store, "<div>plain</div>");
    let mut controller = bind(&store, &id);
    let revision = store.revision();

    let outcome = controller.handle_key_down(&KeyEvent::new("Enter"), &mut store);
    assert_eq!(outcome, KeyOutcome::NotHandled);
    assert_eq!(store.revision(), revision);
}

#[test]
fn toolbar_actions_report_the_new_body() {
    let mut store = loaded_store();
    let id = note_with(&mut store, "<div>word</div>");
    let mut controller = bind(&store, &id);

    let text = {
        let surface = controller.surface().unwrap();
        let doc = surface.document();
        let line = doc.children(surface.root())[0];
        doc.children(line)[0]
    };
    controller
        .surface_mut()
        .unwrap()
        .set_selection(Position::new(text, 0), Position::new(text, 4));
    assert!(controller.exec_command(&Command::Bold, &mut store));
    assert_eq!(content_of(&store, &id), "<div><b>word</b></div>");

    controller.surface_mut().unwrap().move_caret_to_end();
    assert!(controller.insert_todo(&mut store));
    assert_eq!(content_of(&store, &id).matches(r#"type="checkbox""#).count(), 1);

    let checkbox = {
        let surface = controller.surface().unwrap();
        let doc = surface.document();
        doc.descendants(surface.root())
            .into_iter()
            .find(|node| doc.has_tag(*node, "input"))
            .unwrap()
    };
    assert!(controller.toggle_checkbox(checkbox, &mut store));
    assert!(content_of(&store, &id).contains(r#"checked="checked""#));
    assert!(controller.toggle_checkbox(checkbox, &mut store));
    assert!(!content_of(&store, &id).contains("checked"));
}

#[test]
fn font_size_is_clamped_and_persisted() {
    let mut store = loaded_store();
    let id = store.add_note();
    let mut controller = bind(&store, &id);

    assert_eq!(controller.handle_font_size_change(200, &mut store), Some(100));
    assert_eq!(store.data().note(&id).unwrap().font_size, Some(100));
    assert_eq!(controller.handle_font_size_change(-5, &mut store), Some(8));
    assert_eq!(store.data().note(&id).unwrap().font_size, Some(8));

    assert_eq!(controller.handle_font_size_input("abc", &mut store), Some(8));
    assert_eq!(controller.handle_font_size_input("0", &mut store), Some(8));
    assert_eq!(
        controller.handle_font_size_input("99999999999999999999", &mut store),
        Some(100)
    );
    assert_eq!(controller.handle_font_size_input("24px", &mut store), Some(24));
    assert_eq!(controller.increase_font_size(&mut store), Some(26));
    assert_eq!(controller.decrease_font_size(&mut store), Some(24));

    assert!(controller.handle_font_family_change("monospace", &mut store));
    let stored = store.data().note(&id).unwrap();
    assert_eq!(stored.font_family.as_deref(), Some("monospace"));
    assert_eq!(stored.content, "");
}

#[test]
fn pasted_images_land_in_completion_order() {
    let mut store = loaded_store();
    let id = note_with(&mut store, "<div>pics</div>");
    let mut controller = RichTextController::new();
    controller.switch_note(store.data().note(&id).unwrap());

    let mut outcome = controller.handle_paste(vec![
        ClipboardItem::new("image/png", vec![1, 2, 3]),
        ClipboardItem::new("text/plain", b"caption".to_vec()),
        ClipboardItem::new("image/gif", vec![4, 5, 6]),
    ]);
    assert!(outcome.prevent_default);
    assert_eq!(outcome.tasks.len(), 2);

    let gif = outcome.tasks.pop().unwrap();
    let png = outcome.tasks.pop().unwrap();
    assert_eq!(gif.complete(&mut store), ImagePasteOutcome::Inserted);
    assert_eq!(png.complete(&mut store), ImagePasteOutcome::Inserted);

    let content = content_of(&store, &id);
    let gif_at = content.find("data:image/gif;base64,").unwrap();
    let png_at = content.find("data:image/png;base64,").unwrap();
    assert!(gif_at < png_at);
    assert!(content.starts_with("<div>pics"));
}

#[test]
fn image_task_after_note_switch_is_detached() {
    let mut store = loaded_store();
    let first = note_with(&mut store, "<div>first</div>");
    let second = note_with(&mut store, "<div>second</div>");
    let mut controller = bind(&store, &first);

    let mut outcome = controller.handle_paste(vec![ClipboardItem::new("image/png", vec![9])]);
    controller.switch_note(store.data().note(&second).unwrap());

    let task = outcome.tasks.pop().unwrap();
    assert_eq!(task.complete(&mut store), ImagePasteOutcome::Detached);
    assert_eq!(content_of(&store, &first), "<div>first</div>");
    assert_eq!(content_of(&store, &second), "<div>second</div>");
}

#[test]
fn unreadable_image_fails_without_touching_the_note() {
    let mut store = loaded_store();
    let id = note_with(&mut store, "<div>x</div>");
    let mut controller = bind(&store, &id);
    let revision = store.revision();

    let mut outcome = controller.handle_paste(vec![ClipboardItem::unreadable("image/png")]);
    let task = outcome.tasks.pop().unwrap();
    assert_eq!(
        task.complete(&mut store),
        ImagePasteOutcome::Failed(PasteError::EmptyPayload {
            mime_type: "image/png".to_string()
        })
    );
    assert_eq!(store.revision(), revision);
}

#[test]
fn export_renders_visible_text() {
    let mut store = loaded_store();
    let id = note_with(&mut store, "<div>a&nbsp;b</div><div><br></div><div>c</div>");
    let mut controller = bind(&store, &id);
    assert!(controller.rename("Plan", &mut store));
    assert_eq!(store.data().note(&id).unwrap().title, "Plan");

    let export = controller.export().unwrap();
    assert_eq!(export.file_name, "Plan.txt");
    assert_eq!(export.mime_type, "text/plain");
    assert_eq!(export.text, "a b\n\nc");

    let dir = tempfile::tempdir().unwrap();
    let path = export.write_to_dir(dir.path()).unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), "a b\n\nc");

    controller.rename("", &mut store);
    assert_eq!(controller.export().unwrap().file_name, "Untitled Note.txt");
}

#[test]
fn category_assignment_feeds_note_queries() {
    let mut store = loaded_store();
    let id = note_with(&mut store, "<div>quarterly goals</div>");
    let mut controller = bind(&store, &id);
    assert!(controller.assign_category(Some("cat-work"), &mut store));

    let data = store.data();
    let filter = NoteFilter::all().in_category("cat-work").matching("GOALS");
    let filtered = filter_notes(&data.notes, &filter);
    assert_eq!(filtered.len(), 1);
    assert_eq!(current_note(data, &filtered, None).unwrap().id, id);
}
