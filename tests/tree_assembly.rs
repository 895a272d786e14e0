//! Page tree assembly against an in-memory workspace.

mod common;

use common::*;
use notion_image_bed::model::{Block, BlockCommon, LinkToPageBlock};
use notion_image_bed::types::PageId;
use notion_image_bed::{NotionId, Page, PageTreeAssembler, PageWindow};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn root() -> NotionId {
    NotionId::from(&PageId::new_v4())
}

fn texts(records: &[notion_image_bed::BlockRecord]) -> Vec<String> {
    records.iter().map(|record| record.text.clone()).collect()
}

#[tokio::test]
async fn test_toggle_children_are_nested_in_order() {
    let root = root();
    let toggle = toggle("more", true);
    let fake = FakeNotion::new()
        .with_children(&root, vec![bold_paragraph("a"), toggle.clone()])
        .with_children(&id_of(&toggle), vec![paragraph("b")]);

    let tree = PageTreeAssembler::new(Arc::new(fake))
        .assemble(&root, &PageWindow::full())
        .await
        .unwrap();

    assert_eq!(tree.blocks.len(), 2);
    assert_eq!(tree.blocks[0].block_type, "paragraph");
    assert_eq!(tree.blocks[0].text, "<strong>a</strong>");
    assert_eq!(tree.blocks[1].block_type, "toggle");

    let children = tree.blocks[1].children.as_ref().expect("toggle children");
    assert_eq!(texts(children), vec!["b"]);
    assert!(tree.complete);
    assert!(!tree.has_more);
    assert!(!tree.timed_out);
    assert_eq!(tree.next_cursor, None);
}

#[tokio::test]
async fn test_table_rows_keep_cell_order() {
    let root = root();
    let table = table(2);
    let fake = FakeNotion::new()
        .with_children(&root, vec![table.clone()])
        .with_children(
            &id_of(&table),
            vec![table_row(&["a1", "b1"]), table_row(&["a2", "b2"])],
        );

    let tree = PageTreeAssembler::new(Arc::new(fake))
        .assemble(&root, &PageWindow::full())
        .await
        .unwrap();

    let table = &tree.blocks[0];
    assert_eq!(table.table_width, Some(2));
    assert_eq!(table.has_column_header, Some(true));
    let rows = table.rows.as_ref().expect("table rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].cells, Some(vec!["a1".to_string(), "b1".to_string()]));
    assert_eq!(rows[1].cells, Some(vec!["a2".to_string(), "b2".to_string()]));
    assert!(table.children.is_none());
}

#[tokio::test]
async fn test_limit_then_cursor_resumes_at_batch_boundary() {
    let root = root();
    let fake = Arc::new(FakeNotion::new().with_children(
        &root,
        vec![paragraph("one"), paragraph("two"), paragraph("three")],
    ));
    let assembler = PageTreeAssembler::new(fake.clone());

    let first = assembler
        .assemble(
            &root,
            &PageWindow {
                limit: Some(1),
                cursor: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(texts(&first.blocks), vec!["one"]);
    assert!(first.has_more);
    assert!(first.next_cursor.is_some());
    assert_eq!(fake.requested_sizes(), vec![1]);

    let rest = assembler
        .assemble(
            &root,
            &PageWindow {
                limit: None,
                cursor: first.next_cursor.clone(),
            },
        )
        .await
        .unwrap();

    assert_eq!(texts(&rest.blocks), vec!["two", "three"]);
    assert!(!rest.has_more);
    assert_eq!(rest.next_cursor, None);
}

#[tokio::test]
async fn test_order_and_count_survive_any_batch_size() {
    let root = root();
    let toggle = toggle("nested", true);
    let mut top: Vec<Block> = (0..9).map(|i| paragraph(&format!("p{}", i))).collect();
    top.insert(4, toggle.clone());
    let nested: Vec<Block> = (0..5).map(|i| paragraph(&format!("n{}", i))).collect();

    let mut expected: Vec<String> = (0..9).map(|i| format!("p{}", i)).collect();
    expected.insert(4, "nested".to_string());

    for batch in [1, 2, 3, 7, 100] {
        let fake = FakeNotion::new()
            .with_children(&root, top.clone())
            .with_children(&id_of(&toggle), nested.clone())
            .with_max_batch(batch);

        let tree = PageTreeAssembler::new(Arc::new(fake))
            .assemble(&root, &PageWindow::full())
            .await
            .unwrap();

        assert_eq!(texts(&tree.blocks), expected, "batch size {}", batch);
        assert_eq!(
            texts(tree.blocks[4].children.as_ref().unwrap()),
            vec!["n0", "n1", "n2", "n3", "n4"],
            "batch size {}",
            batch
        );
        assert!(tree.complete);
    }
}

#[tokio::test]
async fn test_limit_spanning_several_batches() {
    let root = root();
    let blocks: Vec<Block> = (0..10).map(|i| paragraph(&format!("p{}", i))).collect();
    let fake = FakeNotion::new()
        .with_children(&root, blocks)
        .with_max_batch(3);

    let tree = PageTreeAssembler::new(Arc::new(fake))
        .assemble(
            &root,
            &PageWindow {
                limit: Some(5),
                cursor: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(texts(&tree.blocks), vec!["p0", "p1", "p2", "p3", "p4"]);
    assert!(tree.has_more);
    assert_eq!(tree.next_cursor.as_deref(), Some("5"));
}

#[tokio::test]
async fn test_synced_source_referring_to_itself_is_expanded_once() {
    let root = root();
    let source = synced_original();
    let copy_inside_source = synced_copy_of(&source);
    let fake = FakeNotion::new()
        .with_block(source.clone())
        .with_children(&id_of(&source), vec![copy_inside_source])
        .with_children(&root, vec![synced_copy_of(&source)]);

    let tree = PageTreeAssembler::new(Arc::new(fake))
        .assemble(&root, &PageWindow::full())
        .await
        .unwrap();

    let expanded = tree.blocks[0]
        .synced_content
        .as_ref()
        .expect("source expanded");
    let inner = expanded.children.as_ref().expect("source children");
    assert_eq!(inner.len(), 1);
    assert!(inner[0].synced_content.is_none());
    assert!(!tree.complete);
}

#[tokio::test]
async fn test_unavailable_synced_source_omits_field_only() {
    let root = root();
    let missing_source = synced_original();
    let fake = FakeNotion::new().with_children(
        &root,
        vec![synced_copy_of(&missing_source), paragraph("after")],
    );

    let tree = PageTreeAssembler::new(Arc::new(fake))
        .assemble(&root, &PageWindow::full())
        .await
        .unwrap();

    assert_eq!(tree.blocks.len(), 2);
    assert_eq!(tree.blocks[0].block_type, "synced_block");
    assert!(tree.blocks[0].synced_content.is_none());
    assert_eq!(tree.blocks[1].text, "after");
}

#[tokio::test]
async fn test_nested_failure_keeps_siblings() {
    let root = root();
    let broken = toggle("broken", true);
    let fake = FakeNotion::new()
        .with_children(&root, vec![broken.clone(), paragraph("sibling")])
        .failing_children_of(&id_of(&broken));

    let tree = PageTreeAssembler::new(Arc::new(fake))
        .assemble(&root, &PageWindow::full())
        .await
        .unwrap();

    assert_eq!(texts(&tree.blocks), vec!["broken", "sibling"]);
    assert!(tree.blocks[0].children.is_none());
    assert!(!tree.complete);
    assert!(!tree.timed_out);
}

#[tokio::test]
async fn test_depth_guard_marks_incomplete() {
    let root = root();
    let outer = toggle("outer", true);
    let inner = toggle("inner", true);
    let fake = FakeNotion::new()
        .with_children(&root, vec![outer.clone()])
        .with_children(&id_of(&outer), vec![inner.clone()])
        .with_children(&id_of(&inner), vec![paragraph("too deep")]);

    let tree = PageTreeAssembler::new(Arc::new(fake))
        .with_limits(1, 100)
        .assemble(&root, &PageWindow::full())
        .await
        .unwrap();

    let outer_children = tree.blocks[0].children.as_ref().expect("first level");
    assert_eq!(texts(outer_children), vec!["inner"]);
    assert!(outer_children[0].children.is_none());
    assert!(!tree.complete);
}

#[tokio::test]
async fn test_node_guard_stops_assembly() {
    let root = root();
    let blocks: Vec<Block> = (0..5).map(|i| paragraph(&format!("p{}", i))).collect();
    let fake = FakeNotion::new().with_children(&root, blocks);

    let tree = PageTreeAssembler::new(Arc::new(fake))
        .with_limits(20, 3)
        .assemble(&root, &PageWindow::full())
        .await
        .unwrap();

    assert_eq!(texts(&tree.blocks), vec!["p0", "p1", "p2"]);
    assert!(!tree.complete);
}

#[tokio::test]
async fn test_node_guard_inside_a_batch_cannot_be_resumed() {
    let root = root();
    let blocks: Vec<Block> = (0..6).map(|i| paragraph(&format!("p{}", i))).collect();
    let fake = FakeNotion::new()
        .with_children(&root, blocks)
        .with_max_batch(4);

    let tree = PageTreeAssembler::new(Arc::new(fake))
        .with_limits(20, 3)
        .assemble(&root, &PageWindow::full())
        .await
        .unwrap();

    assert_eq!(texts(&tree.blocks), vec!["p0", "p1", "p2"]);
    assert!(!tree.complete);
    assert!(!tree.has_more);
    assert_eq!(tree.next_cursor, None);
}

#[tokio::test]
async fn test_rejected_cursor_is_an_error() {
    let root = root();
    let fake = FakeNotion::new().with_children(&root, vec![paragraph("one")]);

    let result = PageTreeAssembler::new(Arc::new(fake))
        .assemble(
            &root,
            &PageWindow {
                limit: None,
                cursor: Some("garbage".to_string()),
            },
        )
        .await;

    let err = result.unwrap_err();
    assert!(err.is_invalid_input());
}

#[tokio::test]
async fn test_column_list_columns_carry_their_children() {
    let root = root();
    let list = column_list();
    let (left, right) = (column(), column());
    let fake = FakeNotion::new()
        .with_children(&root, vec![list.clone(), paragraph("after")])
        .with_children(&id_of(&list), vec![left.clone(), right.clone()])
        .with_children(&id_of(&left), vec![paragraph("l1"), paragraph("l2")])
        .with_children(&id_of(&right), vec![paragraph("r1")]);

    let tree = PageTreeAssembler::new(Arc::new(fake))
        .assemble(&root, &PageWindow::full())
        .await
        .unwrap();

    assert_eq!(tree.blocks.len(), 2);
    let list = &tree.blocks[0];
    assert_eq!(list.block_type, "column_list");
    assert!(list.children.is_none());

    let columns = list.columns.as_ref().expect("columns");
    assert_eq!(columns.len(), 2);
    assert!(columns.iter().all(|column| column.block_type == "column"));
    assert_eq!(texts(columns[0].children.as_ref().unwrap()), vec!["l1", "l2"]);
    assert_eq!(texts(columns[1].children.as_ref().unwrap()), vec!["r1"]);
    assert_eq!(tree.blocks[1].text, "after");
    assert!(tree.complete);
}

#[tokio::test]
async fn test_deadline_returns_partial_tree() {
    let root = root();
    let toggles: Vec<Block> = (0..4).map(|i| toggle(&format!("t{}", i), true)).collect();
    let mut fake = FakeNotion::new()
        .with_children(&root, toggles.clone())
        .with_delay(Duration::from_millis(100));
    for toggle in &toggles {
        fake = fake.with_children(&id_of(toggle), vec![paragraph("child")]);
    }

    let tree = PageTreeAssembler::new(Arc::new(fake))
        .with_deadline(Duration::from_millis(250))
        .assemble(&root, &PageWindow::full())
        .await
        .unwrap();

    assert!(tree.timed_out);
    assert!(!tree.complete);
    assert_eq!(tree.blocks.len(), 4);
    assert!(tree.blocks[0].children.is_some());
    assert!(tree.blocks[3].children.is_none());
}

#[tokio::test]
async fn test_link_to_page_resolves_title() {
    let root = root();
    let target = Page::new(PageId::new_v4(), "Target page");
    let missing = PageId::new_v4();
    let link = |page_id: PageId| {
        Block::LinkToPage(LinkToPageBlock {
            common: BlockCommon::default(),
            page_id,
        })
    };
    let fake = FakeNotion::new()
        .with_children(&root, vec![link(target.id.clone()), link(missing)])
        .with_page(target);

    let tree = PageTreeAssembler::new(Arc::new(fake))
        .assemble(&root, &PageWindow::full())
        .await
        .unwrap();

    assert_eq!(tree.blocks[0].title.as_deref(), Some("Target page"));
    assert_eq!(tree.blocks[1].title.as_deref(), Some("Untitled"));
    assert!(tree.complete);
}
