use dynamic_connectivity::{CutResult, DynamicConnectivity, FastConnectivity};

fn link(t: &mut impl DynamicConnectivity, u: usize, v: usize) {
    let merged = t.link(u, v);
    println!(
        "Adding edge {u}-{v}: {}",
        if merged { "components merged" } else { "already connected" }
    );
}

fn cut(t: &mut impl DynamicConnectivity, u: usize, v: usize) {
    let what = match t.cut(u, v) {
        CutResult::Absent => "no such edge",
        CutResult::Bridge => "was a bridge",
        CutResult::StillConnected => "still connected",
    };
    println!("Removing edge {u}-{v}: {what}");
}

fn main() {
    let mut t = FastConnectivity::new(10);
    for u in 0..9 {
        link(&mut t, u, u + 1);
    }
    println!("Path on 10 vertices: {} component(s)", t.count_cc());
    link(&mut t, 0, 9);
    println!("Closed into a cycle: {} component(s)", t.count_cc());
    cut(&mut t, 4, 5);
    println!(
        "Component of 0 has {} vertices, 0 and 5 connected: {}",
        t.size(0),
        t.same(0, 5)
    );
    cut(&mut t, 0, 9);
    println!(
        "Components: {}, 0 and 5 connected: {}",
        t.count_cc(),
        t.same(0, 5)
    );
    cut(&mut t, 0, 9);
}
