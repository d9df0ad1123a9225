//! End-to-end pipeline: index → thumbs → generate on a real content tree.

use chiaki_site::{config, generate, process, scan};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_image(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 3 % 256) as u8, (y * 5 % 256) as u8, 200])
    })
    .save(path)
    .unwrap();
}

fn content_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::write(root.join("landing.md"), "## 千秋稲荷社とは\n\n歡迎參拜。\n").unwrap();
    fs::write(
        root.join("config.toml"),
        "[site]\ntitle = \"千秋稻荷社\"\nurl = \"https://example.com\"\n",
    )
    .unwrap();

    let art = root.join("assets/character");
    let poster = art.join("20250505_Friend_Big_Poster");
    write_image(&poster.join("poster.png"), 120, 80);
    write_image(&poster.join("poster_R18.png"), 80, 120);
    fs::write(poster.join("poster.psd"), "layers").unwrap();

    let wallpaper = art.join("20250326_廢墟桌布");
    write_image(&wallpaper.join("wall.jpg"), 160, 90);
    fs::write(
        wallpaper.join("project.toml"),
        "layout = \"vertical\"\n\n[crop]\n\"wall.jpg\" = \"top\"\n",
    )
    .unwrap();

    let sketches = art.join("Sketches");
    fs::create_dir_all(&sketches).unwrap();
    fs::write(
        sketches.join("mark.svg"),
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"/>"#,
    )
    .unwrap();
    tmp
}

struct Built {
    _content: TempDir,
    _work: TempDir,
    dist: std::path::PathBuf,
    index: chiaki_site::index::ProjectIndex,
    second_run: chiaki_site::cache::CacheStats,
}

fn build() -> Built {
    let content = content_tree();
    let work = TempDir::new().unwrap();
    let source = content.path();
    let index_path = work.path().join("index.json");
    let thumbs = work.path().join("thumbs");
    let dist = work.path().join("dist");

    let site_config = config::load_config(source).unwrap();
    let index = scan::scan(source, &site_config).unwrap();
    process::write_index(&index, &index_path).unwrap();

    let first = process::process(&index_path, source, &thumbs, &site_config, true, None).unwrap();
    assert_eq!(first.failures, 0);
    process::write_index(&first.index, &index_path).unwrap();

    let second = process::process(&index_path, source, &thumbs, &site_config, true, None).unwrap();

    generate::generate(&index_path, source, &thumbs, &dist, &site_config).unwrap();

    Built {
        _content: content,
        _work: work,
        dist,
        index: first.index,
        second_run: second.cache_stats,
    }
}

#[test]
fn index_orders_projects_newest_first() {
    let built = build();
    let ids: Vec<&str> = built.index.projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["Sketches", "20250505_Friend_Big_Poster", "20250326_廢墟桌布"]
    );
    let poster = built.index.project_by_id("20250505_Friend_Big_Poster").unwrap();
    assert_eq!(poster.author, "Friend");
    assert_eq!(poster.title, "Big Poster");
    assert_eq!(poster.date, "2025/05/05");
    assert_eq!(poster.download_files.len(), 1);
    assert!(poster.images[1].r18);
}

#[test]
fn thumbs_fill_in_dimensions() {
    let built = build();
    let poster = built.index.project_by_id("20250505_Friend_Big_Poster").unwrap();
    assert_eq!(poster.images[0].width, Some(120));
    assert_eq!(poster.images[0].height, Some(80));
}

#[test]
fn second_thumbs_run_is_fully_cached() {
    let built = build();
    assert_eq!(built.second_run.misses, 0);
    assert!(built.second_run.hits > 0);
}

#[test]
fn every_route_has_a_page() {
    let built = build();
    for file in [
        "index.html",
        "character/index.html",
        "character/art/index.html",
        "fonts/index.html",
        "links/index.html",
    ] {
        assert!(built.dist.join(file).exists(), "missing {file}");
    }
}

#[test]
fn thumbnails_and_originals_land_in_dist() {
    let built = build();
    let poster = built.dist.join("assets/character/20250505_Friend_Big_Poster");
    assert!(poster.join("poster.png").exists());
    assert!(poster.join("poster_thumb_large.jpg").exists());
    assert!(poster.join("poster_thumb_small.jpg").exists());
    assert!(poster.join("poster.psd").exists());
    assert!(!built.dist.join("assets/character/20250326_廢墟桌布/project.toml").exists());
    assert!(!built.dist.join("assets/character/Sketches/mark_thumb_small.jpg").exists());
}

#[test]
fn art_page_references_thumbnails_and_gates_r18() {
    let built = build();
    let html = fs::read_to_string(built.dist.join("character/art/index.html")).unwrap();
    assert!(html.contains("poster_thumb_small.jpg"));
    assert!(html.contains("Big Poster"));
    assert!(html.contains("gallery-data"));
    assert!(html.contains("r18"));
    // svg has no thumbnail and falls back to the original
    assert!(html.contains("/assets/character/Sketches/mark.svg"));
}

#[test]
fn landing_page_uses_config_and_markdown() {
    let built = build();
    let html = fs::read_to_string(built.dist.join("index.html")).unwrap();
    assert!(html.contains("千秋稻荷社"));
    assert!(html.contains("<h2>千秋稲荷社とは</h2>"));
    assert!(html.contains("https://example.com"));
}
