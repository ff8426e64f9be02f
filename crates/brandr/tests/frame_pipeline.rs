//! End-to-end CPU-side frame: scene mutation, camera refresh, tile window,
//! sprite collection, one accumulated vertex stream.

use brandr::prelude::*;

#[test]
fn full_frame_accumulates_tiles_and_sprites() {
    let mut scene = SceneGraph::new();
    let mut camera = Camera::new(&mut scene, 800.0, 600.0);
    scene.set_position(camera.node(), dvec2(1600.0, 1600.0));

    let mut atlas = Atlas::new(256.0, 256.0);
    let grass_cell = atlas.add_cell(AtlasCell {
        x: 0.0,
        y: 0.0,
        w: 32.0,
        h: 32.0,
    });
    let hero_cell = atlas.add_cell(AtlasCell {
        x: 32.0,
        y: 0.0,
        w: 48.0,
        h: 48.0,
    });

    let mut catalog = TileCatalog::new();
    let grass = catalog
        .register(TileType {
            cell: grass_cell,
            offset: DVec2::ZERO,
        })
        .unwrap();

    let mut layer = TileLayer::dense(&mut scene, 100, 100, 32.0, 32.0);
    layer.replace_region(0, 0, 100, 100, grass).unwrap();

    let hero = scene.spawn();
    scene.set_position(hero, dvec2(1600.0, 1600.0));
    let sprites = [Sprite {
        node: hero,
        cell: hero_cell,
        width: 48.0,
        height: 48.0,
        alpha: 1.0,
    }];

    let mut batch = QuadBatch::new(1024);
    batch.clear();
    layer.emit(&mut scene, &mut camera, &catalog, &atlas, &mut batch);
    collect_sprites(&mut scene, &sprites, &atlas, &mut batch);

    // 26 x 20 tile window plus the one sprite.
    assert_eq!(batch.quad_count(), 26 * 20 + 1);
    assert_eq!(batch.index_count(), (26 * 20 + 1) * 6);
    assert_eq!(batch.vertex_count(), batch.quad_count() * 4);

    // The sprite's quad is the last four records, anchored at its node.
    let v = batch.vertices();
    let base = v.len() - 4;
    assert_eq!(v[base].position, [1600.0, 1600.0]);
    assert_eq!(v[base + 2].position, [1648.0, 1648.0]);

    // Next frame reuses the accumulator from empty.
    batch.clear();
    assert_eq!(batch.quad_count(), 0);
    assert_eq!(batch.index_count(), 0);
}

#[test]
fn hit_testing_agrees_with_camera_mapping() {
    let mut scene = SceneGraph::new();
    let mut camera = Camera::new(&mut scene, 800.0, 600.0);
    let target = scene.spawn();
    scene.set_position(target, dvec2(100.0, 100.0));
    let mut hitbox = HitBox::new(target, DVec2::ZERO, 30.0, 30.0);

    // An unmoved camera maps stage pixels straight onto world units: a
    // click outside the box misses, one on its interior hits.
    let miss = camera.transform_stage_to_world(&mut scene, dvec2(400.0, 300.0));
    assert!(!hitbox.check(&mut scene, miss));

    let hit = camera.transform_stage_to_world(&mut scene, dvec2(115.0, 115.0));
    assert!(hitbox.check(&mut scene, hit));
}

#[test]
fn serialized_layer_renders_identically() {
    let mut scene = SceneGraph::new();
    let mut camera = Camera::new(&mut scene, 320.0, 240.0);

    let mut atlas = Atlas::new(64.0, 64.0);
    let cell = atlas.add_cell(AtlasCell {
        x: 0.0,
        y: 0.0,
        w: 16.0,
        h: 16.0,
    });
    let mut catalog = TileCatalog::new();
    let t = catalog
        .register(TileType {
            cell,
            offset: DVec2::ZERO,
        })
        .unwrap();

    let mut layer = TileLayer::dense(&mut scene, 20, 15, 16.0, 16.0);
    layer.replace_region(2, 3, 5, 4, t).unwrap();

    let json = serde_json::to_string(&layer.to_data()).unwrap();
    let data: TileLayerData = serde_json::from_str(&json).unwrap();
    let restored = TileLayer::from_data(&mut scene, data, 16.0, 16.0);

    let mut a = QuadBatch::new(512);
    let mut b = QuadBatch::new(512);
    layer.emit(&mut scene, &mut camera, &catalog, &atlas, &mut a);
    restored.emit(&mut scene, &mut camera, &catalog, &atlas, &mut b);
    assert_eq!(a.quad_count(), 20);
    assert_eq!(a.vertices(), b.vertices());
}
