//! 端到端对话流程测试
//!
//! 通过 `AppState` 执行终端命令，检查输出文本、相机与存档。

use dialogue_runtime::{ContentPack, GameMode};
use host::{AppConfig, AppState, HostCommand};
use tempfile::TempDir;

const PACK: &str = r#"{
    "scripts": [
        {
            "id": "ava_intro",
            "lines": [
                { "text": "Hi!", "tags": ["speaker: Ava", "sprite: Ava_happy"] },
                { "text": "Nice to meet you.", "tags": ["speaker: Blake"] }
            ]
        },
        { "id": "ava_idle", "lines": [ { "text": "...", "tags": ["speaker: Ava"] } ] },
        {
            "id": "long_talk",
            "lines": [
                { "text": "one" },
                { "text": "two" },
                { "text": "three" }
            ]
        }
    ],
    "sources": [
        {
            "display_name": "Ava",
            "stable_id": "ava",
            "nodes": [
                { "script": "ava_intro", "unlocks_flags": ["met_ava"], "max_plays": 1 },
                { "script": "ava_idle", "required_flags": ["met_ava"] }
            ]
        },
        {
            "display_name": "Old Sign",
            "stable_id": "sign",
            "nodes": [ { "script": "long_talk" } ]
        },
        { "display_name": "Ghost", "stable_id": "ghost", "nodes": [ { "script": "missing" } ] },
        { "display_name": "Rock", "stable_id": "rock" }
    ],
    "sprites": ["Ava_happy"]
}"#;

fn app(typewriter: bool) -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.saves_dir = dir.path().join("saves");
    config.presentation.enable_typewriter = typewriter;
    let pack = ContentPack::from_json(PACK).unwrap();
    (AppState::from_content(config, pack), dir)
}

fn run(app: &mut AppState, line: &str) -> Vec<String> {
    let command = HostCommand::parse(line).unwrap();
    app.execute(command);
    app.take_output()
}

#[test]
fn test_interact_plays_lines_then_ends() {
    let (mut app, _dir) = app(false);

    assert_eq!(
        run(&mut app, "interact ava"),
        vec![
            "[mode visual_novel]",
            "[portrait right Ava_happy]",
            "Ava: Hi!",
        ]
    );
    assert!(app.context.is_in_dialogue());

    assert_eq!(run(&mut app, ""), vec!["Blake: Nice to meet you."]);
    assert_eq!(run(&mut app, "submit"), vec!["[mode walk]", "[end]"]);
    assert!(!app.context.is_in_dialogue());
    assert!(app.context.selector().has_flag("met_ava"));
}

#[test]
fn test_exhausted_node_falls_through() {
    let (mut app, _dir) = app(false);

    run(&mut app, "interact Ava");
    run(&mut app, "");
    run(&mut app, "");

    // 右侧立绘在会话结束后仍然保留，所以会跳动
    let output = run(&mut app, "interact ava");
    assert_eq!(output, vec!["[mode visual_novel]", "[hop right]", "Ava: ..."]);
}

#[test]
fn test_interact_without_content() {
    let (mut app, _dir) = app(false);

    assert_eq!(run(&mut app, "interact rock"), vec!["Rock 没有什么要说的"]);
    assert_eq!(run(&mut app, "interact nobody"), vec!["没有找到对象: nobody"]);
    assert_eq!(run(&mut app, "interact ghost"), vec!["脚本缺失: missing"]);
    assert!(!app.context.is_in_dialogue());
}

#[test]
fn test_interact_while_busy() {
    let (mut app, _dir) = app(false);

    run(&mut app, "interact sign");
    assert_eq!(run(&mut app, "interact ava"), vec!["对话进行中"]);
    assert!(!app.context.selector().has_flag("met_ava"));
}

#[test]
fn test_typewriter_submit_completes_first() {
    let (mut app, _dir) = app(true);

    run(&mut app, "interact sign");
    assert!(app.context.presenter().is_typing());

    assert!(run(&mut app, "").is_empty());
    assert!(!app.context.presenter().is_typing());
    assert_eq!(app.context.presenter().displayed_text(), "one");

    assert_eq!(run(&mut app, ""), vec!["two"]);
}

#[test]
fn test_typewriter_finishes_while_waiting() {
    let (mut app, _dir) = app(true);

    run(&mut app, "interact sign");
    run(&mut app, "wait 1");
    assert!(!app.context.presenter().is_typing());
    assert_eq!(app.context.presenter().displayed_text(), "one");
}

#[test]
fn test_skip_runs_through_session() {
    let (mut app, _dir) = app(true);

    run(&mut app, "interact sign");
    let output = run(&mut app, "skip 2");

    assert_eq!(output, vec!["two", "three", "[mode walk]", "[end]"]);
    assert!(!app.context.is_in_dialogue());
    assert!(!app.context.presenter().is_skipping());
}

#[test]
fn test_camera_follows_mode() {
    let (mut app, _dir) = app(false);

    run(&mut app, "wait 0.1");
    assert_eq!(app.cameras.mode(), Some(GameMode::Walk));
    assert_eq!(app.cameras.camera(GameMode::Walk).priority, 10);

    run(&mut app, "interact sign");
    assert_eq!(app.cameras.mode(), Some(GameMode::VisualNovel));
    assert!(app.cameras.camera(GameMode::VisualNovel).enabled);
    assert!(!app.cameras.camera(GameMode::Walk).enabled);
    assert!(app.cameras.has_pending_priority());

    run(&mut app, "wait 0.1");
    assert_eq!(app.cameras.camera(GameMode::VisualNovel).priority, 10);
    assert_eq!(app.cameras.camera(GameMode::Walk).priority, 0);
}

#[test]
fn test_flag_commands() {
    let (mut app, _dir) = app(false);

    assert_eq!(run(&mut app, "flags"), vec!["(无标记)"]);
    assert_eq!(run(&mut app, "flag set b"), vec!["+ b"]);
    run(&mut app, "flag set a");
    assert_eq!(run(&mut app, "flags"), vec!["a, b"]);
    assert_eq!(run(&mut app, "flag clear a"), vec!["- a"]);
    assert_eq!(run(&mut app, "flags"), vec!["b"]);
}

#[test]
fn test_history_command() {
    let (mut app, _dir) = app(false);

    run(&mut app, "interact ava");
    run(&mut app, "");
    run(&mut app, "");

    assert_eq!(
        run(&mut app, "history 5"),
        vec!["Ava: Hi!", "Blake: Nice to meet you."]
    );
    assert_eq!(run(&mut app, "history 1"), vec!["Blake: Nice to meet you."]);
}

#[test]
fn test_save_load_round_trip() {
    let (mut app, _dir) = app(false);

    run(&mut app, "interact ava");
    run(&mut app, "");
    run(&mut app, "");
    assert_eq!(run(&mut app, "save 1"), vec!["已保存到槽位 1"]);

    assert_eq!(run(&mut app, "reset"), vec!["进度已重置"]);
    assert!(!app.context.selector().has_flag("met_ava"));

    assert_eq!(run(&mut app, "load 1"), vec!["已读取槽位 1"]);
    assert!(app.context.selector().has_flag("met_ava"));
    assert_eq!(app.context.presenter().history().line_count(), 2);

    // 第一个节点仍然是已用尽状态
    let output = run(&mut app, "interact ava");
    assert_eq!(output.last().map(String::as_str), Some("Ava: ..."));
}

#[test]
fn test_load_ends_active_session() {
    let (mut app, _dir) = app(false);

    run(&mut app, "save 2");
    run(&mut app, "interact sign");

    assert_eq!(
        run(&mut app, "load 2"),
        vec!["[mode walk]", "[end]", "已读取槽位 2"]
    );
    assert!(!app.context.is_in_dialogue());
}

#[test]
fn test_load_missing_slot() {
    let (mut app, _dir) = app(false);

    let output = run(&mut app, "load 7");
    assert_eq!(output.len(), 1);
    assert!(output[0].starts_with("读档失败"));
}

#[test]
fn test_saves_listing() {
    let (mut app, _dir) = app(false);

    assert_eq!(run(&mut app, "saves"), vec!["(无存档)"]);

    run(&mut app, "flag set x");
    run(&mut app, "save 3");
    let output = run(&mut app, "saves");
    assert_eq!(output.len(), 1);
    assert!(output[0].starts_with("#003 "));
    assert!(output[0].ends_with("(1 个标记)"));
}

#[test]
fn test_reset_ends_session() {
    let (mut app, _dir) = app(false);

    run(&mut app, "interact ava");
    let output = run(&mut app, "reset");

    assert_eq!(output, vec!["[mode walk]", "[end]", "进度已重置"]);
    assert!(!app.context.selector().has_flag("met_ava"));
    assert!(app.context.presenter().history().is_empty());
}

#[test]
fn test_quit() {
    let (mut app, _dir) = app(false);
    assert_eq!(app.execute(HostCommand::Quit), host::Flow::Quit);
    assert_eq!(app.execute(HostCommand::Flags), host::Flow::Continue);
}
