use anyhow::bail;
use glam::{Mat4, Vec3};
use umbra::shadow::{point_light_transforms, spot_light_transform};
use umbra::{
    calculate_shadow_projection, BoundingBox, Camera, CascadeConfig, CascadeManager,
    CascadeUniform, DirectionalLight, LightTransform, MeshBounds, PointLight, ShadowConfig,
    ShadowProjectionMode, ShadowProjectionParameters, ShadowUniform, SpotLight,
};

fn mesh(min: Vec3, max: Vec3) -> MeshBounds {
    MeshBounds::new(BoundingBox::new(min, max))
}

fn demo_scene() -> Vec<MeshBounds> {
    let mut meshes = vec![
        // Ground
        mesh(Vec3::new(-50.0, -50.0, -1.0), Vec3::new(150.0, 50.0, 0.0)),
        // Tower behind the camera
        mesh(Vec3::new(-20.0, -3.0, 0.0), Vec3::new(-14.0, 3.0, 40.0)),
    ];
    for i in 0..5 {
        let x = 10.0 + i as f32 * 12.0;
        let y = if i % 2 == 0 { -6.0 } else { 4.0 };
        meshes.push(mesh(
            Vec3::new(x, y, 0.0),
            Vec3::new(x + 3.0, y + 3.0, 2.0 + i as f32 * 2.0),
        ));
    }
    meshes
}

fn parse_mode(name: &str) -> anyhow::Result<Vec<ShadowProjectionMode>> {
    Ok(match name {
        "uniform" => vec![ShadowProjectionMode::Uniform],
        "psm" => vec![ShadowProjectionMode::Psm],
        "lspsm" => vec![ShadowProjectionMode::Lspsm],
        "tsm" => vec![ShadowProjectionMode::Tsm],
        "all" => vec![
            ShadowProjectionMode::Uniform,
            ShadowProjectionMode::Psm,
            ShadowProjectionMode::Lspsm,
            ShadowProjectionMode::Tsm,
        ],
        other => {
            bail!("unknown projection mode '{other}' (expected uniform, psm, lspsm, tsm or all)")
        }
    })
}

fn print_matrix(label: &str, m: &Mat4) {
    println!("  {label}:");
    for row in 0..4 {
        let r = m.row(row);
        println!("    [{:>10.4} {:>10.4} {:>10.4} {:>10.4}]", r.x, r.y, r.z, r.w);
    }
}

fn print_transform(transform: &LightTransform) {
    print_matrix("view", &transform.view);
    print_matrix("proj", &transform.proj);
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let modes = parse_mode(&std::env::args().nth(1).unwrap_or_else(|| "all".to_string()))?;

    let camera = Camera::new_perspective(
        Vec3::new(0.0, 0.0, 2.0),
        Vec3::new(1.0, 0.0, 1.5),
        Vec3::Z,
        60.0,
        16.0 / 9.0,
        0.1,
        200.0,
    );
    let meshes = demo_scene();
    let sun = DirectionalLight::from_direction(Vec3::new(-0.5, 0.3, -1.0));
    let shadow_config = ShadowConfig::default();

    for mode in modes {
        let mut params = ShadowProjectionParameters::default();
        let transform =
            calculate_shadow_projection(mode, sun.direction(), &camera, &meshes, &mut params);
        log::info!(
            "{mode:?}: depth [{:.2}, {:.2}], cos gamma {:.3}, inverted {}",
            params.z_near,
            params.z_far,
            params.cos_gamma,
            params.shadow_test_inverted
        );

        println!("{mode:?}");
        print_transform(&transform);
        let uniform = ShadowUniform::new(&transform, &shadow_config)
            .with_inverted_test(params.shadow_test_inverted);
        log::debug!("{mode:?} uniform: {} bytes", std::mem::size_of_val(&uniform));
    }

    let cascades =
        CascadeManager::new(CascadeConfig::default()).cascade_shadow_map_data(&camera, &sun);
    println!("Cascades: splits {:?}", cascades.splits());
    print_matrix("view", &cascades.view);
    for (i, proj) in cascades.proj[..cascades.split_count].iter().enumerate() {
        print_matrix(&format!("crop {i}"), proj);
    }
    let uniform = CascadeUniform::from_cascades(&cascades);
    log::debug!("cascade uniform: {} splits", uniform.count);

    let spot = SpotLight::with_cone(
        Vec3::new(20.0, 0.0, 10.0),
        Vec3::new(0.2, 0.0, -1.0),
        35.0,
        30.0,
    );
    println!("Spot light");
    print_transform(&spot_light_transform(&spot, 0.1));

    let lamp = PointLight::new(Vec3::new(30.0, 2.0, 4.0), 15.0);
    let faces = ["+X", "-X", "+Y", "-Y", "+Z", "-Z"];
    for (face, transform) in faces.iter().zip(point_light_transforms(&lamp, 0.1)) {
        println!("Point light {face}");
        print_transform(&transform);
    }

    Ok(())
}
