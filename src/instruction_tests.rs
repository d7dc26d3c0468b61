#[cfg(test)]
mod tests {
    use crate::error::CommandError;
    use crate::instruction::*;
    use test_log::test;

    fn decode(word: u64) -> Instruction {
        Instruction::decode(word).unwrap().unwrap()
    }

    fn rejects(word: u64) -> CommandError {
        Instruction::decode(word).unwrap_err()
    }

    #[test]
    fn test_vertex_load() {
        let i = decode(0x0100_4008_0600_0100);
        assert_eq!(i.name(), "G_VTX");
        assert_eq!(i.opcode(), 0x01);
        let vtx = i.cast::<Vtx>().unwrap();
        assert_eq!(vtx.count, 4);
        assert_eq!(vtx.dest, 0);
        assert_eq!(vtx.address.segment(), 0x06);
        assert_eq!(vtx.address.offset(), 0x100);
        assert_eq!(vtx.address.to_string(), "06:000100");
        assert!(i.cast::<Tri1>().is_none());
    }

    #[test]
    fn test_vertex_load_overflow() {
        // dest 30 + count 4 runs past the 32-entry buffer
        let e = rejects(0x0100_4044_0600_0000);
        assert!(e.to_string().contains("G_VTX"));
        // zero vertices
        rejects(0x0100_0000_0600_0000);
    }

    #[test]
    fn test_triangles() {
        let t = decode(0x0500_0204_0000_0000);
        assert_eq!(t.cast::<Tri1>().unwrap().vertices, [0, 1, 2]);

        let t2 = decode(0x0600_0204_0006_0402);
        let t2 = t2.cast::<Tri2>().unwrap();
        assert_eq!(t2.first, [0, 1, 2]);
        assert_eq!(t2.second, [3, 2, 1]);

        // vertex 32 is out of range
        rejects(0x0500_4002_0000_0000);
    }

    #[test]
    fn test_cull_range() {
        let c = decode(0x0300_0000_0000_0014);
        assert_eq!(c.cast::<CullDl>(), Some(&CullDl { first: 0, last: 10 }));
        rejects(0x0300_0014_0000_0014);
    }

    #[test]
    fn test_scissor_modes() {
        let s = decode(0xED00_0000_0050_03C0);
        let s = s.cast::<SetScissor>().unwrap();
        assert_eq!(s.mode, ScissorMode::NonInterlace);
        assert_eq!(s.lr.0.to_f64(), 320.0);
        assert_eq!(s.lr.1.to_f64(), 240.0);

        let even = decode(0xED00_0000_0250_03C0);
        assert_eq!(
            even.cast::<SetScissor>().unwrap().mode,
            ScissorMode::EvenInterlace
        );

        let e = rejects(0xED00_0000_0150_03C0);
        assert!(e.to_string().contains("scanline mode"));
    }

    #[test]
    fn test_texture_scale() {
        let t = decode(0xD700_0002_FFFF_8000);
        let t = t.cast::<Texture>().unwrap();
        assert!(t.on);
        assert_eq!(t.level, 0);
        assert_eq!(t.tile, 0);
        assert_eq!(t.scale_s.bits(), 0xFFFF);
        assert_eq!(t.scale_t.to_f64(), 0.5);

        rejects(0xD700_0004_FFFF_FFFF);
    }

    #[test]
    fn test_combiner() {
        let c = decode(0xFC12_7E00_FFFF_F200);
        let c = c.cast::<SetCombine>().unwrap();
        assert_eq!(c.cycles[0].color, CombineInputs { a: 1, b: 15, c: 4, d: 7 });
        assert_eq!(c.cycles[0].alpha, CombineInputs { a: 7, b: 7, c: 7, d: 1 });
        assert_eq!(c.cycles[1].color, CombineInputs { a: 0, b: 15, c: 0, d: 0 });
        assert_eq!(c.cycles[1].alpha, CombineInputs { a: 7, b: 0, c: 7, d: 0 });
    }

    #[test]
    fn test_set_tile() {
        let t = decode(0xF510_1000_0701_4050);
        let t = t.cast::<SetTile>().unwrap();
        assert_eq!(t.format, ImageFormat::Rgba);
        assert_eq!(t.size, TexelSize::Bits16);
        assert_eq!(t.line, 8);
        assert_eq!(t.tmem, 0);
        assert_eq!(t.tile, 7);
        assert_eq!(t.palette, 0);
        assert_eq!(t.t.mask, 5);
        assert_eq!(t.s.mask, 5);
        assert!(!t.s.clamp && !t.s.mirror);

        // format 5 does not exist
        rejects(0xF5A0_1000_0701_4050);
    }

    #[test]
    fn test_matrix_flags() {
        let m = decode(0xDA38_0003_0D00_0000);
        let m = m.cast::<Mtx>().unwrap();
        assert!(!m.push);
        assert!(m.load);
        assert!(!m.projection);
        assert_eq!(m.address.segment(), 0x0D);
    }

    #[test]
    fn test_segment_validation() {
        let dl = decode(0xDE00_0000_0600_1000);
        assert_eq!(dl.call_target(), Some(SegAddr(0x0600_1000)));
        assert!(!dl.cast::<Dl>().unwrap().branch);
        assert!(decode(0xDE01_0000_0600_1000).cast::<Dl>().unwrap().branch);
        rejects(0xDE00_0000_8000_1000);
    }

    #[test]
    fn test_moveword_segment() {
        let m = decode(0xDB06_0018_0012_3000);
        let m = m.cast::<MoveWord>().unwrap();
        assert_eq!(m.index, MoveWordIndex::Segment);
        assert_eq!(m.segment(), Some(6));
        assert_eq!(m.data, 0x0012_3000);
        rejects(0xDB06_0042_0000_0000);
        rejects(0xDB10_0000_0000_0000);
    }

    #[test]
    fn test_other_mode() {
        let l = decode(0xE200_1E01_0000_0000);
        assert_eq!(
            l.cast::<SetOtherModeL>(),
            Some(&SetOtherModeL {
                shift: 0,
                len: 2,
                data: 0
            })
        );
        // data outside the two-bit field
        rejects(0xE200_1E01_0000_0004);

        let all = decode(0xEF20_0000_0000_0004);
        let all = all.cast::<RdpSetOtherMode>().unwrap();
        assert_eq!(all.cycle_type(), CycleType::Copy);
        assert!(all.z_source_prim());
    }

    #[test]
    fn test_load_block() {
        let b = decode(0xF300_0000_077F_F800);
        let b = b.cast::<LoadBlock>().unwrap();
        assert_eq!(b.tile, 7);
        assert_eq!(b.texels, 2048);
        assert_eq!(b.dxt.to_f64(), 1.0);
    }

    #[test]
    fn test_convert_coefficients() {
        let k: [i64; 6] = [175, -43, -89, 222, 114, 42];
        let mut word = 0xECu64 << 56;
        for (i, v) in k.iter().enumerate() {
            word |= ((*v as u64) & 0x1FF) << (45 - 9 * i);
        }
        let c = decode(word);
        assert_eq!(
            c.cast::<SetConvert>().unwrap().k,
            [175, -43, -89, 222, 114, 42]
        );
    }

    #[test]
    fn test_geometry_mode() {
        let g = decode(0xD9FF_FFFF_0002_0405);
        let g = g.cast::<GeometryMode>().unwrap();
        assert_eq!(g.clear, 0);
        assert_eq!(
            geometry_flag_names(g.set),
            vec!["G_ZBUFFER", "G_SHADE", "G_CULL_BACK", "G_LIGHTING"]
        );
    }

    #[test]
    fn test_unrecognised_words() {
        assert_eq!(Instruction::decode(0x4200_0000_0000_0000), Ok(None));
        assert_eq!(Instruction::decode(0xDF00_0000_0000_0001), Ok(None));
        assert_eq!(Instruction::decode(0xE700_0000_0000_0001), Ok(None));
    }

    #[test]
    fn test_display() {
        let i = decode(0xFB00_0000_FF80_4020);
        assert_eq!(
            i.cast::<SetEnvColor>().unwrap().color,
            Rgba {
                r: 0xFF,
                g: 0x80,
                b: 0x40,
                a: 0x20
            }
        );
        let text = i.to_string();
        assert!(text.starts_with("G_SETENVCOLOR"));
        assert!(decode(0xDF00_0000_0000_0000).is_end());
    }

    const EVERY_COMMAND: [(u64, &str); 53] = [
        (0x0000_0000_1234_5678, "G_NOOP"),
        (0x0100_4008_0600_0100, "G_VTX"),
        (0x0214_000A_0000_0080, "G_MODIFYVTX"),
        (0x0300_0000_0000_0014, "G_CULLDL"),
        (0x0400_F006_0001_0000, "G_BRANCH_Z"),
        (0x0500_0204_0000_0000, "G_TRI1"),
        (0x0600_0204_0006_0402, "G_TRI2"),
        (0x0700_0204_0000_0406, "G_QUAD"),
        (0xD312_3456_89AB_CDEF, "G_SPECIAL_3"),
        (0xD412_3456_89AB_CDEF, "G_SPECIAL_2"),
        (0xD512_3456_89AB_CDEF, "G_SPECIAL_1"),
        (0xD682_003F_0400_0000, "G_DMA_IO"),
        (0xD700_0002_FFFF_8000, "G_TEXTURE"),
        (0xD838_0002_0000_0080, "G_POPMTX"),
        (0xD9FF_FFFF_0002_0405, "G_GEOMETRYMODE"),
        (0xDA38_0003_0D00_0000, "G_MTX"),
        (0xDB06_0018_0012_3000, "G_MOVEWORD"),
        (0xDC08_0208_0200_0010, "G_MOVEMEM"),
        (0xDD00_07FF_0010_0000, "G_LOAD_UCODE"),
        (0xDE00_0000_0600_1000, "G_DL"),
        (0xDF00_0000_0000_0000, "G_ENDDL"),
        (0xE000_0000_0000_0000, "G_SPNOOP"),
        (0xE100_0000_0600_0800, "G_RDPHALF_1"),
        (0xE200_1E01_0000_0000, "G_SETOTHERMODE_L"),
        (0xE300_0A01_0010_0000, "G_SETOTHERMODE_H"),
        (0xE450_03C0_0100_0000, "G_TEXRECT"),
        (0xE550_03C0_0100_0000, "G_TEXRECTFLIP"),
        (0xE600_0000_0000_0000, "G_RDPLOADSYNC"),
        (0xE700_0000_0000_0000, "G_RDPPIPESYNC"),
        (0xE800_0000_0000_0000, "G_RDPTILESYNC"),
        (0xE900_0000_0000_0000, "G_RDPFULLSYNC"),
        (0xEA10_0080_8040_2010, "G_SETKEYGB"),
        (0xEB00_0000_0200_FF01, "G_SETKEYR"),
        (0xEC00_0000_0000_0000, "G_SETCONVERT"),
        (0xED00_0000_0050_03C0, "G_SETSCISSOR"),
        (0xEE00_0000_FFFE_0010, "G_SETPRIMDEPTH"),
        (0xEF20_0000_0000_0004, "G_RDPSETOTHERMODE"),
        (0xF000_0000_073F_C000, "G_LOADTLUT"),
        (0xF100_0000_DEAD_BEEF, "G_RDPHALF_2"),
        (0xF200_0000_0007_C07C, "G_SETTILESIZE"),
        (0xF300_0000_077F_F800, "G_LOADBLOCK"),
        (0xF400_0000_0707_C07C, "G_LOADTILE"),
        (0xF510_1000_0701_4050, "G_SETTILE"),
        (0xF64F_C3BC_0000_0000, "G_FILLRECT"),
        (0xF700_0000_FFFC_FFFC, "G_SETFILLCOLOR"),
        (0xF800_0000_C8C8_C8FF, "G_SETFOGCOLOR"),
        (0xF900_0000_0000_0008, "G_SETBLENDCOLOR"),
        (0xFA00_0380_FFFF_FFFF, "G_SETPRIMCOLOR"),
        (0xFB00_0000_FF80_4020, "G_SETENVCOLOR"),
        (0xFC12_7E00_FFFF_F200, "G_SETCOMBINE"),
        (0xFD10_0000_0600_0000, "G_SETTIMG"),
        (0xFE00_0000_0E00_0000, "G_SETZIMG"),
        (0xFF10_013F_0F00_0000, "G_SETCIMG"),
    ];

    #[test]
    fn test_every_command_dispatches() {
        for (word, name) in EVERY_COMMAND {
            let i = decode(word);
            assert_eq!(i.name(), name, "{:016X}", word);
            assert_eq!(i.opcode() as u64, word >> 56, "{}", name);
        }
        for entry in crate::opcode_tables::OPCODES {
            assert!(
                EVERY_COMMAND.iter().any(|(_, name)| *name == entry.name),
                "no word for {}",
                entry.name
            );
        }
    }

    #[test]
    fn test_raw_words() {
        assert_eq!(
            decode(0x0000_0000_1234_5678).cast::<Noop>(),
            Some(&Noop { tag: 0x1234_5678 })
        );
        assert_eq!(
            decode(0xD312_3456_89AB_CDEF).cast::<Special3>(),
            Some(&Special3 {
                hi: 0x12_3456,
                lo: 0x89AB_CDEF
            })
        );
        assert_eq!(
            decode(0xD412_3456_89AB_CDEF).cast::<Special2>().map(|c| c.hi),
            Some(0x12_3456)
        );
        assert_eq!(
            decode(0xD512_3456_89AB_CDEF).cast::<Special1>().map(|c| c.lo),
            Some(0x89AB_CDEF)
        );
        assert_eq!(
            decode(0xE100_0000_0600_0800).cast::<RdpHalf1>(),
            Some(&RdpHalf1 { value: 0x0600_0800 })
        );
        assert_eq!(
            decode(0xF100_0000_DEAD_BEEF).cast::<RdpHalf2>(),
            Some(&RdpHalf2 { value: 0xDEAD_BEEF })
        );
        assert_eq!(
            decode(0xF700_0000_FFFC_FFFC).cast::<SetFillColor>(),
            Some(&SetFillColor { value: 0xFFFC_FFFC })
        );
        // nonzero padding in the high word is not a no-op
        assert_eq!(Instruction::decode(0x0000_0001_0000_0000), Ok(None));
    }

    #[test]
    fn test_unit_commands() {
        assert_eq!(decode(0xE000_0000_0000_0000).cast::<SpNoop>(), Some(&SpNoop));
        assert_eq!(
            decode(0xE600_0000_0000_0000).cast::<RdpLoadSync>(),
            Some(&RdpLoadSync)
        );
        assert_eq!(
            decode(0xE700_0000_0000_0000).cast::<RdpPipeSync>(),
            Some(&RdpPipeSync)
        );
        assert_eq!(
            decode(0xE800_0000_0000_0000).cast::<RdpTileSync>(),
            Some(&RdpTileSync)
        );
        assert_eq!(
            decode(0xE900_0000_0000_0000).cast::<RdpFullSync>(),
            Some(&RdpFullSync)
        );
        assert_eq!(Instruction::decode(0xE900_0000_0000_0100), Ok(None));
    }

    #[test]
    fn test_modify_vertex() {
        let m = decode(0x0214_000A_0000_0080);
        assert_eq!(
            m.cast::<ModifyVtx>(),
            Some(&ModifyVtx {
                attribute: VertexAttribute::St,
                vertex: 5,
                value: 0x80
            })
        );
        // attribute offset 0x20 does not exist
        let e = rejects(0x0220_000A_0000_0080);
        assert!(e.to_string().contains("attribute offset"));
        // vertex 32
        rejects(0x0210_0040_0000_0000);
    }

    #[test]
    fn test_branch_z() {
        let b = decode(0x0400_F006_0001_0000);
        assert_eq!(
            b.cast::<BranchZ>(),
            Some(&BranchZ {
                vertex: 3,
                z: 0x0001_0000
            })
        );
        // vertex * 5 field says 16, index field says 3
        let e = rejects(0x0401_0006_0001_0000);
        assert!(e.to_string().contains("disagree"));
    }

    #[test]
    fn test_quad() {
        let q = decode(0x0700_0204_0000_0406);
        let q = q.cast::<Quad>().unwrap();
        assert_eq!(q.first, [0, 1, 2]);
        assert_eq!(q.second, [0, 2, 3]);
        rejects(0x0700_4002_0000_0000);
    }

    #[test]
    fn test_dma_io() {
        let d = decode(0xD682_003F_0400_0000);
        assert_eq!(
            d.cast::<DmaIo>(),
            Some(&DmaIo {
                write: true,
                dmem: 0x80,
                size: 64,
                dram: SegAddr(0x0400_0000)
            })
        );
        rejects(0xD682_003F_8000_0000);
    }

    #[test]
    fn test_pop_matrix() {
        let p = decode(0xD838_0002_0000_0080);
        assert_eq!(p.cast::<PopMtx>(), Some(&PopMtx { count: 2 }));
        rejects(0xD838_0002_0000_0000);
    }

    #[test]
    fn test_move_mem() {
        let m = decode(0xDC08_0208_0200_0010);
        assert_eq!(
            m.cast::<MoveMem>(),
            Some(&MoveMem {
                size: 16,
                offset: 16,
                index: MoveMemIndex::Viewport,
                address: SegAddr(0x0200_0010)
            })
        );
        let e = rejects(0xDC08_0005_0200_0000);
        assert!(e.to_string().contains("index 5"));
    }

    #[test]
    fn test_load_ucode() {
        let u = decode(0xDD00_07FF_0010_0000);
        assert_eq!(
            u.cast::<LoadUcode>(),
            Some(&LoadUcode {
                data_size: 0x800,
                text: SegAddr(0x0010_0000)
            })
        );
        rejects(0xDD00_07FF_8010_0000);
    }

    #[test]
    fn test_other_mode_high() {
        let h = decode(0xE300_0A01_0010_0000);
        assert_eq!(
            h.cast::<SetOtherModeH>(),
            Some(&SetOtherModeH {
                shift: 20,
                len: 2,
                data: 0x0010_0000
            })
        );
        // 31 bits from the top plus 2 bits runs off the word
        let e = rejects(0xE300_1F01_0000_0000);
        assert!(e.to_string().contains("overflows"));
        rejects(0xE300_0A01_0040_0000);
    }

    #[test]
    fn test_texture_rectangles() {
        let r = decode(0xE450_03C0_0100_0000);
        let r = r.cast::<TexRect>().unwrap().0;
        assert_eq!(r.tile, 1);
        assert_eq!((r.ul.0.to_f64(), r.ul.1.to_f64()), (0.0, 0.0));
        assert_eq!((r.lr.0.to_f64(), r.lr.1.to_f64()), (320.0, 240.0));

        let f = decode(0xE550_03C0_0100_0000);
        assert_eq!(f.cast::<TexRectFlip>().unwrap().0, r);

        // upper-left corner past the lower-right one
        let e = rejects(0xE400_0000_0050_03C0);
        assert!(e.to_string().contains("past lower-right"));
        rejects(0xE500_0000_0050_03C0);
    }

    #[test]
    fn test_tile_rectangles() {
        let s = decode(0xF200_0000_0007_C07C);
        let s = s.cast::<SetTileSize>().unwrap().0;
        assert_eq!(s.tile, 0);
        assert_eq!(s.ul.0.raw(), 0);
        assert_eq!((s.lr.0.to_f64(), s.lr.1.to_f64()), (31.0, 31.0));
        rejects(0xF200_4000_0000_0000);

        let l = decode(0xF400_0000_0707_C07C);
        let l = l.cast::<LoadTile>().unwrap().0;
        assert_eq!(l.tile, 7);
        assert_eq!(l.lr, s.lr);
        rejects(0xF400_4000_0700_0000);
    }

    #[test]
    fn test_fill_rect() {
        let f = decode(0xF64F_C3BC_0000_0000);
        let f = f.cast::<FillRect>().unwrap();
        assert_eq!((f.lr.0.to_f64(), f.lr.1.to_f64()), (319.0, 239.0));
        assert_eq!((f.ul.0.raw(), f.ul.1.raw()), (0, 0));
        rejects(0xF600_0000_0000_4000);
        // the tile byte is fixed at zero
        assert_eq!(Instruction::decode(0xF64F_C3BC_0100_0000), Ok(None));
    }

    #[test]
    fn test_chroma_keys() {
        let gb = decode(0xEA10_0080_8040_2010);
        let gb = gb.cast::<SetKeyGb>().unwrap();
        assert_eq!(gb.green.width.to_f64(), 1.0);
        assert_eq!((gb.green.center, gb.green.scale), (0x80, 0x40));
        assert_eq!(gb.blue.width.to_f64(), 0.5);
        assert_eq!((gb.blue.center, gb.blue.scale), (0x20, 0x10));

        let r = decode(0xEB00_0000_0200_FF01);
        let r = r.cast::<SetKeyR>().unwrap();
        assert_eq!(r.red.width.to_f64(), 2.0);
        assert_eq!((r.red.center, r.red.scale), (0xFF, 0x01));
    }

    #[test]
    fn test_prim_depth() {
        let d = decode(0xEE00_0000_FFFE_0010);
        assert_eq!(d.cast::<SetPrimDepth>(), Some(&SetPrimDepth { z: -2, dz: 16 }));
    }

    #[test]
    fn test_load_tlut() {
        let t = decode(0xF000_0000_073F_C000);
        assert_eq!(t.cast::<LoadTlut>(), Some(&LoadTlut { tile: 7, count: 256 }));
        let e = rejects(0xF000_0000_0740_0000);
        assert!(e.to_string().contains("257 palette entries"));
    }

    #[test]
    fn test_load_block_limit() {
        let e = rejects(0xF300_0000_0780_0000);
        assert!(e.to_string().contains("2049 texels"));
    }

    #[test]
    fn test_colors() {
        assert_eq!(
            decode(0xF800_0000_C8C8_C8FF).cast::<SetFogColor>().unwrap().color,
            Rgba {
                r: 200,
                g: 200,
                b: 200,
                a: 255
            }
        );
        assert_eq!(
            decode(0xF900_0000_0000_0008).cast::<SetBlendColor>().unwrap().color.a,
            8
        );

        let p = decode(0xFA00_0380_FFFF_FFFF);
        let p = p.cast::<SetPrimColor>().unwrap();
        assert_eq!(p.min_level, 3);
        assert_eq!(p.lod_fraction.to_f64(), 0.5);
        assert_eq!(p.color.r, 0xFF);
    }

    #[test]
    fn test_image_pointers() {
        let t = decode(0xFD10_0000_0600_0000);
        assert_eq!(
            t.cast::<SetTImg>().unwrap().0,
            ImageSource {
                format: ImageFormat::Rgba,
                size: TexelSize::Bits16,
                width: 1,
                address: SegAddr(0x0600_0000)
            }
        );
        let ci = decode(0xFD48_0000_0600_0000);
        let ci = ci.cast::<SetTImg>().unwrap().0;
        assert_eq!((ci.format, ci.size), (ImageFormat::Ci, TexelSize::Bits8));
        // format 7 does not exist
        rejects(0xFDE0_0000_0600_0000);

        let c = decode(0xFF10_013F_0F00_0000);
        let c = c.cast::<SetCImg>().unwrap().0;
        assert_eq!(c.width, 320);
        assert_eq!(c.address.segment(), 0x0F);
        rejects(0xFF10_013F_8040_0000);

        let z = decode(0xFE00_0000_0E00_0000);
        assert_eq!(
            z.cast::<SetZImg>(),
            Some(&SetZImg {
                address: SegAddr(0x0E00_0000)
            })
        );
        rejects(0xFE00_0000_F000_0000);
    }
}
