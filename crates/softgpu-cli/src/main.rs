//! `softgpu` — command-line interface to the device emulator.
//!
//! ```text
//! USAGE:
//!   softgpu gpus               List all emulated GPU models
//!   softgpu info <gpu>         Query answers one model reports
//!   softgpu regs <gpu>         Modeled register table for one model
//!   softgpu uevent <gpu>       Synthetic uevent block for one model
//!   softgpu probe [gpu]        Drive a full driver-style probe sequence
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use softgpu_chip::abi::{self, InfoQuery, InfoReply};
use softgpu_chip::{pcie, profiles};
use softgpu_shim::{query, sysfs, InfoArgs, IoctlArg, ShimDevice};

#[derive(Parser)]
#[command(name = "softgpu", about = "No-op GPU kernel-interface emulator", version)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List all emulated GPU models.
    Gpus,
    /// Print the query answers one model reports.
    Info {
        /// Profile name (e.g. renoir), case-insensitive.
        gpu: String,
    },
    /// Print the modeled register table for one model.
    Regs {
        /// Profile name (e.g. stoney), case-insensitive.
        gpu: String,
    },
    /// Print the synthetic uevent block for one model.
    Uevent {
        /// Profile name, case-insensitive.
        gpu: String,
    },
    /// Drive a full driver-style probe sequence against one model.
    Probe {
        /// Profile name; defaults to the first table entry.
        gpu: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Cmd::Gpus => cmd_gpus(),
        Cmd::Info { gpu } => cmd_info(&gpu)?,
        Cmd::Regs { gpu } => cmd_regs(&gpu)?,
        Cmd::Uevent { gpu } => cmd_uevent(&gpu)?,
        Cmd::Probe { gpu } => cmd_probe(gpu.as_deref())?,
    }

    Ok(())
}

fn cmd_gpus() {
    println!("Emulated GPU models: {}", profiles::PROFILES.len());
    println!();

    for (i, p) in profiles::PROFILES.iter().enumerate() {
        let default = if i == 0 { "  (default)" } else { "" };
        println!(
            "[{i}] {:8} {}{default}",
            p.name,
            pcie::lspci_filter(p.dev.device_id)
        );
        println!(
            "     gfx v{}.{}  {} CUs  vram {} MiB  gtt {} MiB  {} registers",
            p.hw_ip_gfx.hw_ip_version_major,
            p.hw_ip_gfx.hw_ip_version_minor,
            p.dev.cu_active_number,
            p.mem.vram >> 20,
            p.mem.gtt >> 20,
            p.mmr_regs.len(),
        );
    }
}

fn cmd_info(gpu: &str) -> Result<()> {
    let p = softgpu_shim::select_profile(Some(gpu))?;

    println!("{} — device {}", p.name, pcie::lspci_filter(p.dev.device_id));
    println!();
    println!("device info");
    println!("  family            {}", p.dev.family);
    println!("  external rev      {:#x}", p.dev.external_rev);
    println!("  shader engines    {}", p.dev.num_shader_engines);
    println!("  active CUs        {}", p.dev.cu_active_number);
    println!("  engine clock      {} kHz", p.dev.max_engine_clock);
    println!("  memory clock      {} kHz", p.dev.max_memory_clock);
    println!(
        "  va range          {:#x}..{:#x}",
        p.dev.virtual_address_offset, p.dev.virtual_address_max
    );
    println!();

    println!("firmware");
    println!("  me   v{:<4} feature {}", p.fw_gfx_me.ver, p.fw_gfx_me.feature);
    println!("  pfp  v{:<4} feature {}", p.fw_gfx_pfp.ver, p.fw_gfx_pfp.feature);
    println!("  mec  v{:<4} feature {}", p.fw_gfx_mec.ver, p.fw_gfx_mec.feature);
    println!();

    let mem = query::memory_info(p);
    println!("memory");
    for (name, heap) in [
        ("vram", mem.vram),
        ("visible vram", mem.cpu_accessible_vram),
        ("gtt", mem.gtt),
    ] {
        println!(
            "  {name:13} total {:>6} MiB  usable {:>6} MiB  max alloc {:>6} MiB",
            heap.total_heap_size >> 20,
            heap.usable_heap_size >> 20,
            heap.max_allocation >> 20,
        );
    }

    Ok(())
}

fn cmd_regs(gpu: &str) -> Result<()> {
    let p = softgpu_shim::select_profile(Some(gpu))?;

    println!("{}: {} modeled registers", p.name, p.mmr_regs.len());
    for r in p.mmr_regs {
        println!(
            "  {:#06x}  instance {:#010x}  = {:#010x}",
            r.offset, r.instance, r.value
        );
    }
    Ok(())
}

fn cmd_uevent(gpu: &str) -> Result<()> {
    let p = softgpu_shim::select_profile(Some(gpu))?;
    print!("{}", sysfs::uevent_text(p));
    Ok(())
}

fn cmd_probe(gpu: Option<&str>) -> Result<()> {
    let profile = softgpu_shim::select_profile(gpu)?;
    let dev = ShimDevice::new(profile)?;
    let session = dev.open_session(3);

    let mut run = |query: InfoQuery| -> Result<InfoReply> {
        let mut arg = IoctlArg::Info(InfoArgs::new(query));
        dev.ioctl(&session, abi::REQ_INFO, &mut arg)?;
        match arg {
            IoctlArg::Info(InfoArgs {
                reply: Some(reply), ..
            }) => Ok(reply),
            _ => unreachable!("successful info request always replies"),
        }
    };

    println!("probing {}", profile.name);

    if let InfoReply::AccelWorking(working) = run(InfoQuery::AccelWorking)? {
        println!("  accel working     {working}");
    }
    if let InfoReply::HwIp(gfx) = run(InfoQuery::HwIpInfo {
        ip_type: abi::hw_ip::GFX,
    })? {
        println!(
            "  gfx ip            v{}.{} rings {:#x}",
            gfx.hw_ip_version_major, gfx.hw_ip_version_minor, gfx.available_rings
        );
    }
    if let InfoReply::Firmware(me) = run(InfoQuery::FwVersion {
        fw_type: abi::fw::GFX_ME,
    })? {
        println!("  me firmware       v{} feature {}", me.ver, me.feature);
    }
    if let InfoReply::Memory(mem) = run(InfoQuery::Memory)? {
        println!(
            "  vram              {} MiB usable, {} MiB max alloc",
            mem.vram.usable_heap_size >> 20,
            mem.vram.max_allocation >> 20
        );
    }
    if let InfoReply::MmrRegs(vals) = run(InfoQuery::ReadMmrReg {
        offset: softgpu_chip::regs::GB_ADDR_CONFIG,
        count: 1,
        instance: softgpu_chip::regs::INSTANCE_BROADCAST,
    })? {
        println!("  gb_addr_config    {:#010x}", vals[0]);
    }

    let mut create = IoctlArg::GemCreate(abi::GemCreateArgs {
        bo_size: 1 << 20,
        ..abi::GemCreateArgs::default()
    });
    dev.ioctl(&session, abi::REQ_GEM_CREATE, &mut create)?;
    if let IoctlArg::GemCreate(created) = create {
        let mut mmap = IoctlArg::GemMmap(abi::GemMmapArgs {
            handle: created.handle,
            addr_ptr: 0,
        });
        dev.ioctl(&session, abi::REQ_GEM_MMAP, &mut mmap)?;
        if let IoctlArg::GemMmap(mapped) = mmap {
            println!(
                "  bo create/map     handle {} offset {:#x}",
                created.handle, mapped.addr_ptr
            );
        }
    }

    println!("probe complete");
    Ok(())
}
