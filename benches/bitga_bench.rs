//! Criterion benchmarks for u-bitga.
//!
//! Uses OneMax over a segmented bit string to measure engine overhead
//! (crossover, mutation, sorting, survivor installation) and the raw
//! genotype primitives.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_bitga::error::GaResult;
use u_bitga::ga::{crossover, selection, GaConfig, GaPlan, GeneticAlgorithm};
use u_bitga::genotype::{GenoType, Layout};
use u_bitga::individual::Individual;
use u_bitga::random::Lcg48;

// ===========================================================================
// OneMax: maximize the number of set bits
// ===========================================================================

struct OneMax {
    loci: usize,
    rng: Lcg48,
}

impl GaPlan for OneMax {
    type Phenotype = f64;
    type Random = Lcg48;

    fn inflate_individual(&mut self) -> GaResult<Individual> {
        let mut ind = Individual::new(Layout::builder().append_repeated(16, self.loci).inflate()?);
        ind.randomize(&mut self.rng)?;
        Ok(ind)
    }

    fn random(&mut self) -> &mut Lcg48 {
        &mut self.rng
    }

    fn calculate_fitness(&mut self, individuals: &mut [&mut Individual]) -> GaResult<()> {
        for ind in individuals.iter_mut() {
            let ones = ind.genotype().count_ones();
            ind.set_fitness(-(ones as f64))?;
        }
        Ok(())
    }

    fn apply_crossover(&mut self, x: &mut Individual, y: &mut Individual) -> GaResult<()> {
        crossover::two_point(x, y, &mut self.rng)
    }

    fn apply_selection(&mut self, sorted: &[Individual]) -> GaResult<Vec<usize>> {
        selection::select_tournament(sorted, &mut self.rng, sorted.len(), 2)
    }
}

fn bench_ga_onemax(c: &mut Criterion) {
    let mut group = c.benchmark_group("ga_onemax");
    group.sample_size(10);

    for (loci, pop, gen) in [(4usize, 50usize, 50usize), (16, 100, 30), (64, 100, 20)] {
        let config = GaConfig::default()
            .with_population_size(pop)
            .with_mutation_rate(1.0 / (16 * loci) as f64);
        group.bench_with_input(
            BenchmarkId::new(format!("b{}_p{}_g{}", 16 * loci, pop, gen), loci),
            &config,
            |b, config| {
                b.iter(|| {
                    let plan = OneMax {
                        loci,
                        rng: Lcg48::new(42),
                    };
                    let mut ga = GeneticAlgorithm::from_config(plan, config).unwrap();
                    for _ in 0..gen {
                        black_box(ga.step(black_box(config)).unwrap());
                    }
                    black_box(ga.best().unwrap())
                })
            },
        );
    }
    group.finish();
}

fn bench_genotype_mutate(c: &mut Criterion) {
    let mut group = c.benchmark_group("genotype_mutate");

    for bits in [64usize, 1024, 8192] {
        let genotype = GenoType::from_widths(&[bits]).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(bits), &genotype, |b, g| {
            let mut rng = Lcg48::new(7);
            let mut g = g.clone();
            b.iter(|| black_box(g.mutate(&mut rng, 0.01).unwrap()))
        });
    }
    group.finish();
}

fn bench_genotype_swap(c: &mut Criterion) {
    let mut group = c.benchmark_group("genotype_swap");

    for bits in [64usize, 1024, 8192] {
        let mut rng = Lcg48::new(11);
        let mut a = GenoType::from_widths(&[bits]).unwrap();
        let mut b = a.clone();
        a.randomize(&mut rng).unwrap();
        b.randomize(&mut rng).unwrap();
        let mut mask = a.mask();
        mask.set_range(bits / 3, bits).unwrap();
        group.bench_function(BenchmarkId::from_parameter(bits), |bench| {
            bench.iter(|| black_box(GenoType::swap(&mut a, &mut b, black_box(&mask)).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_ga_onemax,
    bench_genotype_mutate,
    bench_genotype_swap
);
criterion_main!(benches);
