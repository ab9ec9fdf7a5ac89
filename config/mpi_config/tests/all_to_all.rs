// Run with `cargo test` for a single rank, or `mpiexec -n <N> cargo test` for a real world.
use mpi_config::{MPIConfig, MPIEngine};

fn test_all_to_all_helper(mpi_config: &MPIConfig, chunk_len: usize) {
    let world_size = mpi_config.world_size();
    let rank = mpi_config.world_rank();
    let total = world_size * chunk_len;

    let send: Vec<i64> = (0..total).map(|o| (rank * total + o) as i64).collect();
    let mut recv = vec![0i64; total];

    mpi_config.all_to_all(&send, &mut recv).unwrap();

    recv.chunks(chunk_len).enumerate().for_each(|(src, chunk)| {
        chunk.iter().enumerate().for_each(|(j, v)| {
            assert_eq!(*v, (src * total + rank * chunk_len + j) as i64);
        })
    });
}

#[test]
fn test_all_to_all() {
    let universe = MPIConfig::init().unwrap();
    let world = universe.world();
    let mpi_config = MPIConfig::new(Some(&world));

    test_all_to_all_helper(&mpi_config, 16);
    // forces the multi-round path
    test_all_to_all_helper(&mpi_config, MPIConfig::CHUNK_SIZE + 3);

    mpi_config.barrier();
}
