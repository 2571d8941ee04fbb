//! End to end: ingest a raster layer, paint, render and export again.

use rastermask::{
    AnnotationData, AnnotationManager, BrushPainter, ImageCompositor, InMemoryAnnotations,
    MaskData, MaskRenderer, Point, RasterLayerData, RasterManager, RendererRegistry, TipShape,
    Viewport,
};

fn layer_json() -> &'static str {
    r#"{
        "mask_annotation_ids_mapping": { "0": 1, "1": 2 },
        "total_pixels": 16,
        "dense_rle": [1, 2, 0, 1, 2, 3, 1, 1, 0, 1, 3, 2, 2, 2, 1, 4]
    }"#
}

#[test]
fn test_layer_paint_render_export() {
    let layer: RasterLayerData = serde_json::from_str(layer_json()).unwrap();

    let mut store = InMemoryAnnotations::new();
    store.set_class_color(1, [255, 0, 0]);
    store.set_class_color(2, [0, 255, 0]);
    store.set_class_color(3, [0, 0, 255]);
    let a = store
        .create_annotation(1, AnnotationData::Mask(MaskData::default()))
        .unwrap();
    let b = store
        .create_annotation(2, AnnotationData::Mask(MaskData::default()))
        .unwrap();
    assert_eq!((a, b), (0, 1));

    let mut rasters = RasterManager::new();
    let raster = rasters.get_or_create_raster_for_image("frame-0", 4, 4);
    let bounds = raster.load_raster_layer(&layer).unwrap();
    assert_eq!(bounds.len(), 2);

    // Label 3 has no annotation and renders transparent.
    let registry = RendererRegistry::new();
    let renderer = registry.get("mask").unwrap();
    let mut compositor = ImageCompositor::new(4, 4);
    renderer.render(raster, store.annotations(), &mut compositor, &Viewport::new());
    assert_eq!(compositor.canvas().get_pixel(0, 2)[3], 0);
    assert!(compositor.canvas().get_pixel(0, 0)[3] > 0);
    assert!(!raster.is_invalidated());

    // Paint class 3 along the bottom row. Label 3 is the lowest label with
    // no annotation, so the stray label 3 pixels join the new mask.
    let mut painter = BrushPainter::new(raster, &store, 3, TipShape::Round, false).unwrap();
    assert_eq!(painter.target_label(), Some(3));
    painter.stroke(Point::new(0.5, 3.5), 0.6);
    painter.stroke(Point::new(3.5, 3.5), 0.6);
    let outcome = painter.end_stroke(&mut store).unwrap();

    let created = outcome.created.unwrap();
    assert!(outcome.deleted.is_empty());
    assert_eq!(raster.get_annotation_mapping(3), Some(created));
    assert_eq!(raster.label_pixel_count(1), 3);
    assert!(raster.is_invalidated());

    let mask = raster.mask_data(created).unwrap();
    assert_eq!(mask.sparse_rle, vec![8, 2, 12, 4]);

    let exported = raster.to_raster_layer();
    assert_eq!(exported.total_pixels, 16);
    assert_eq!(exported.mask_annotation_ids_mapping.get(&created), Some(&3));
    assert_eq!(
        exported.dense_rle,
        vec![1, 2, 0, 1, 2, 3, 1, 1, 0, 1, 3, 2, 2, 2, 3, 4]
    );

    // Deleting the new annotation clears its pixels again.
    let annotation = store.annotation(created).cloned().unwrap();
    store.delete_annotation(created).unwrap();
    let raster_id = rasters.remove_annotation_from_raster(&annotation).unwrap();
    let raster = rasters.raster(raster_id).unwrap();
    assert_eq!(raster.buffer()[8..16], [0, 0, 2, 2, 0, 0, 0, 0]);
    assert_eq!(raster.get_label_index_for_annotation_id(created), None);

    let renderer = MaskRenderer::default();
    let mut raster = rasters.delete_raster(raster_id).unwrap();
    let surface = renderer.labelmap_surface(&mut raster, store.annotations());
    assert_eq!(surface.get_pixel(3, 3)[3], 0);
    assert_eq!(surface.get_pixel(2, 2)[3], 153);
}
